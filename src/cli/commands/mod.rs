//! cli::commands
//!
//! The `argconf` binary's commands.
//!
//! Each command is a [`dispatch::Command`](crate::dispatch::Command): it
//! registers its arguments on the sub-parser it is handed (whose defaults
//! come from the config section named after the command) and runs against
//! the parsed namespace.

mod completion;
mod config;
mod version;

pub use completion::CompletionCommand;
pub use config::ConfigCommand;
pub use version::VersionCommand;
