//! argconf - Argument parsing with defaults from INI configuration files
//!
//! argconf layers three sources of argument values: built-in defaults,
//! values from one or more configuration files, and the command line, each
//! overriding the one before.
//!
//! # Architecture
//!
//! - [`core`] - Configuration store (INI reading, sections, interpolation)
//!   and typed values
//! - [`parser`] - The configuration-aware argument parser, rendered to clap
//! - [`dispatch`] - A small framework for multi-command programs
//! - [`version`] - Version lookup from `git describe` or a release file
//! - [`git`] - Single interface for Git access
//! - [`cli`] - The `argconf` binary's commands
//! - [`ui`] - User-facing output
//!
//! # Example
//!
//! ```no_run
//! use argconf::parser::{ArgumentParser, ArgumentSpec, PrescanOptions};
//! use argconf::core::value::ValueType;
//!
//! let mut parser = ArgumentParser::new("prog").add_help(false);
//! let prescan = parser
//!     .add_and_parse_config_files(
//!         std::env::args().skip(1),
//!         PrescanOptions::new().section("main").add_to_self(true),
//!     )
//!     .unwrap();
//! parser
//!     .add_argument(ArgumentSpec::new(["--jobs"]).value_type(ValueType::Integer))
//!     .unwrap();
//! let args = parser.parse_args(prescan.remaining);
//! println!("jobs = {:?}", args.get_int("jobs"));
//! ```

pub mod cli;
pub mod core;
pub mod dispatch;
pub mod git;
pub mod parser;
pub mod ui;
pub mod version;
