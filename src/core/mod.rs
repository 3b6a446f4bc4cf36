//! core
//!
//! Configuration data and typed values.
//!
//! # Modules
//!
//! - [`config`] - INI reading and the merged section store
//! - [`value`] - Typed values and the conversions that produce them

pub mod config;
pub mod value;
