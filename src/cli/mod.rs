//! cli
//!
//! Command-line interface for the `argconf` binary.
//!
//! # Architecture
//!
//! The binary is a [`Dispatcher`] with three commands. Parsing happens
//! before logging is set up, so `--debug` can come from the command line or
//! from `debug = true` in the `[main]` section of a config file.

pub mod commands;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::dispatch::{DispatchError, Dispatcher};

pub use commands::{CompletionCommand, ConfigCommand, VersionCommand};

/// Program name used in help and completion scripts.
pub const PROG: &str = "argconf";

/// The binary's dispatcher with every command registered.
pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(PROG)
        .about("Command-line arguments with defaults from INI configuration files")
        .register(VersionCommand)
        .register(ConfigCommand)
        .register(CompletionCommand)
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let dispatcher = dispatcher();
    let parsed = match dispatcher.parse(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(DispatchError::Parse(e)) => e.exit(),
        Err(e) => return Err(e.into()),
    };

    init_tracing(parsed.args.get_bool("debug").unwrap_or(false));
    dispatcher.invoke(&parsed)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` directives are honoured; `debug` raises the floor from WARN
/// to DEBUG.
fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let already_installed = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .is_err();
    if already_installed {
        tracing::debug!("keeping the existing log subscriber");
    }
}
