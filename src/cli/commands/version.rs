//! version command - Print the release version

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::value::ValueType;
use crate::dispatch::{Command, Invocation};
use crate::parser::{ArgumentParser, ArgumentSpec, ParserError};
use crate::ui::output::{self, Verbosity};
use crate::version::{get_git_version, DEFAULT_ABBREV};

/// Print the version from `git describe` or the release file.
#[derive(Debug, Default)]
pub struct VersionCommand;

impl Command for VersionCommand {
    fn name(&self) -> &str {
        "version"
    }

    fn about(&self) -> &str {
        "Show the version from git describe or RELEASE-VERSION"
    }

    fn configure(&self, parser: &mut ArgumentParser) -> Result<(), ParserError> {
        parser.add_argument(
            ArgumentSpec::new(["--abbrev"])
                .value_type(ValueType::Integer)
                .default_value(i64::from(DEFAULT_ABBREV))
                .metavar("N")
                .help("Hash digits for commits past the last tag"),
        )?;
        parser.add_argument(
            ArgumentSpec::new(["--path"])
                .metavar("DIR")
                .help("Directory to describe (default: current directory)"),
        )?;
        Ok(())
    }

    fn run(&self, inv: &Invocation<'_>) -> Result<()> {
        let verbosity = Verbosity::from_args(inv.args);
        let abbrev = inv.args.get_int("abbrev").unwrap_or(i64::from(DEFAULT_ABBREV));
        let abbrev = u32::try_from(abbrev).context("--abbrev must not be negative")?;

        let path = match inv.args.get_str("path") {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        output::debug(format!("describing {}", path.display()), verbosity);

        let version = get_git_version(&path, abbrev).context("Failed to determine version")?;
        output::print(version, verbosity);
        Ok(())
    }
}
