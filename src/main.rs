//! argconf: command-line arguments with defaults from INI configuration files

use anyhow::Result;

fn main() -> Result<()> {
    argconf::cli::run()
}
