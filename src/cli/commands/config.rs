//! config command - Show the merged configuration

use anyhow::{Context as _, Result};

use crate::core::config::{ConfigSection, ConfigStore, DEFAULT_SECTION};
use crate::dispatch::{Command, Invocation};
use crate::parser::{ActionKind, ArgumentParser, ArgumentSpec, ParserError};
use crate::ui::output::{self, Verbosity};

/// Print the sections read from `-c/--conffile` files.
#[derive(Debug, Default)]
pub struct ConfigCommand;

impl Command for ConfigCommand {
    fn name(&self) -> &str {
        "config"
    }

    fn about(&self) -> &str {
        "Show the merged configuration files"
    }

    fn configure(&self, parser: &mut ArgumentParser) -> Result<(), ParserError> {
        parser.add_argument(
            ArgumentSpec::new(["-s", "--section"])
                .action(ActionKind::Append)
                .metavar("NAME")
                .help("Only show this section (can be repeated)"),
        )?;
        parser.add_argument(
            ArgumentSpec::new(["--json"])
                .action(ActionKind::StoreTrue)
                .help("Print as JSON"),
        )?;
        Ok(())
    }

    fn run(&self, inv: &Invocation<'_>) -> Result<()> {
        let verbosity = Verbosity::from_args(inv.args);
        let empty = ConfigStore::new();
        let store = inv.store().unwrap_or(&empty);

        let mut names = inv.args.get_strings("section");
        if names.is_empty() {
            names = store.sections().into_iter().map(String::from).collect();
            if names.is_empty() && store.defaults().is_empty() {
                output::warn("no configuration files given (use -c FILE)", verbosity);
            }
        }

        let mut sections = Vec::with_capacity(names.len());
        for name in &names {
            let section = store
                .items(name)
                .with_context(|| format!("Failed to resolve section '{}'", name))?;
            sections.push((name.as_str(), section));
        }

        if inv.args.get_bool("json").unwrap_or(false) {
            let mut map = serde_json::Map::new();
            if !store.defaults().is_empty() {
                map.insert(DEFAULT_SECTION.to_string(), serde_json::to_value(store.defaults())?);
            }
            for (name, section) in &sections {
                map.insert(name.to_string(), serde_json::to_value(section)?);
            }
            output::print(serde_json::to_string_pretty(&map)?, verbosity);
        } else {
            output::print(render_ini(&sections), verbosity);
        }
        Ok(())
    }
}

fn render_ini(sections: &[(&str, ConfigSection)]) -> String {
    sections
        .iter()
        .map(|(name, section)| {
            let body = output::format_pairs(section.iter(), "");
            if body.is_empty() {
                format!("[{}]", name)
            } else {
                format!("[{}]\n{}", name, body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
