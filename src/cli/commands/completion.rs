//! completion command - Generate shell completion scripts

use anyhow::{anyhow, Result};
use clap_complete::{generate, Shell};

use crate::core::value::{Value, ValueType};
use crate::dispatch::{Command, Invocation};
use crate::parser::{ArgumentParser, ArgumentSpec, ParserError};

/// Generate a completion script for the whole parser tree.
#[derive(Debug, Default)]
pub struct CompletionCommand;

fn shell_type() -> ValueType {
    ValueType::custom("shell", |s| {
        s.parse::<Shell>()
            .map(|shell| Value::Str(shell.to_string()))
            .map_err(|_| "expected one of: bash, elvish, fish, powershell, zsh".to_string())
    })
}

impl Command for CompletionCommand {
    fn name(&self) -> &str {
        "completion"
    }

    fn about(&self) -> &str {
        "Generate shell completion scripts"
    }

    fn configure(&self, parser: &mut ArgumentParser) -> Result<(), ParserError> {
        parser.add_argument(
            ArgumentSpec::new(["shell"])
                .value_type(shell_type())
                .help("Shell to generate for (bash, elvish, fish, powershell, zsh)"),
        )?;
        Ok(())
    }

    fn run(&self, inv: &Invocation<'_>) -> Result<()> {
        let shell: Shell = inv
            .args
            .get_str("shell")
            .ok_or_else(|| anyhow!("no shell given"))?
            .parse()
            .map_err(|e: String| anyhow!(e))?;

        let mut cmd = inv.parser.command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}
