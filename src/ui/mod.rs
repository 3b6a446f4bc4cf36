//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing
//!
//! Command output goes to stdout through this module; diagnostics go to
//! stderr through `tracing`.

pub mod output;
