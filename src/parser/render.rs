//! parser::render
//!
//! Rendering the parser tree into a [`clap::Command`] and reading the
//! matches back into a [`Namespace`].
//!
//! Defaults never reach clap. They stay on the [`ArgumentSpec`] and are
//! applied in [`extract`], which is what lets counts start from a
//! configured base and appends extend a configured list.

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::core::value::Value;

use super::argument::{ActionKind, ArgumentSpec, OptionName};
use super::namespace::Namespace;
use super::ArgumentParser;

pub(crate) fn build_command(parser: &ArgumentParser, name: &str) -> Command {
    let mut cmd = Command::new(name.to_string())
        .disable_help_flag(!parser.has_help())
        .disable_help_subcommand(true)
        .args_override_self(true)
        .allow_negative_numbers(true);
    if let Some(about) = parser.about_text() {
        cmd = cmd.about(about.to_string());
    }

    for spec in parser.arguments() {
        let mut arg = build_arg(spec);
        if let Some(group) = spec.group.map(|i| &parser.groups()[i]) {
            arg = arg.help_heading(group.title.clone());
        }
        cmd = cmd.arg(arg);
    }

    // clap headings carry no text of their own
    let notes: Vec<String> = parser
        .groups()
        .iter()
        .filter_map(|g| g.description.as_ref().map(|d| format!("{}: {}", g.title, d)))
        .collect();
    if !notes.is_empty() {
        cmd = cmd.after_help(notes.join("\n"));
    }

    if let Some(set) = parser.subparser_set() {
        cmd = cmd.subcommand_required(set.options.required);
        if let Some(title) = &set.options.title {
            cmd = cmd.subcommand_help_heading(title.clone());
        }
        for entry in &set.entries {
            let sub = build_command(&entry.parser, entry.parser.name())
                .visible_aliases(entry.aliases.clone());
            cmd = cmd.subcommand(sub);
        }
    }
    cmd
}

fn build_arg(spec: &ArgumentSpec) -> Arg {
    let dest = spec.dest();
    let mut arg = Arg::new(dest.clone()).required(spec.is_required());

    let mut short = None;
    let mut long = None;
    for option in spec.options() {
        match option {
            OptionName::Short(c) if short.is_none() => {
                short = Some(*c);
                arg = arg.short(*c);
            }
            OptionName::Short(c) => arg = arg.visible_short_alias(*c),
            OptionName::Long(l) if long.is_none() => {
                long = Some(l.clone());
                arg = arg.long(l.clone());
            }
            OptionName::Long(l) => arg = arg.visible_alias(l.clone()),
        }
    }

    if let Some(help) = spec.help_text() {
        arg = arg.help(help.to_string());
    }

    let action = spec.action_kind();
    if action.takes_value() {
        let value_name = match spec.metavar_text() {
            Some(metavar) => metavar.to_string(),
            None if spec.is_positional() => dest.clone(),
            None => dest.to_uppercase(),
        };
        arg = arg.value_name(value_name).value_parser(spec.effective_type());
    }

    match action {
        ActionKind::Store => arg.action(ArgAction::Set),
        ActionKind::Append | ActionKind::Custom(_) => arg.action(ArgAction::Append),
        ActionKind::StoreTrue | ActionKind::StoreFalse => arg.action(ArgAction::SetTrue),
        ActionKind::Count => arg.action(ArgAction::Count),
        ActionKind::Help => arg.action(ArgAction::Help),
    }
}

/// Build the namespace for `parser` from clap's matches.
///
/// `cmd` is the command the matches came from; it is attached to errors
/// raised by custom actions so they print with usage.
pub(crate) fn extract(
    parser: &ArgumentParser,
    matches: &ArgMatches,
    cmd: &Command,
) -> Result<Namespace, clap::Error> {
    let mut ns = Namespace::new();

    for spec in parser.arguments() {
        let dest = spec.dest();
        let default = spec.effective_default();
        let value = match spec.action_kind() {
            ActionKind::Help => continue,
            ActionKind::Store => matches
                .get_one::<Value>(&dest)
                .cloned()
                .unwrap_or(default),
            ActionKind::StoreTrue if matches.get_flag(&dest) => Value::Bool(true),
            ActionKind::StoreFalse if matches.get_flag(&dest) => Value::Bool(false),
            ActionKind::StoreTrue | ActionKind::StoreFalse => default,
            ActionKind::Count => match matches.get_count(&dest) {
                0 => default,
                n => default
                    .as_int()
                    .unwrap_or(0)
                    .checked_add(i64::from(n))
                    .map(Value::Int)
                    .ok_or_else(|| {
                        clap::Error::raw(
                            ErrorKind::ValueValidation,
                            format!("argument {}: count overflows\n", spec.names().join("/")),
                        )
                        .with_cmd(cmd)
                    })?,
            },
            ActionKind::Append => match matches.get_many::<Value>(&dest) {
                Some(values) => {
                    let mut list = default.as_list().map(<[Value]>::to_vec).unwrap_or_default();
                    list.extend(values.cloned());
                    Value::List(list)
                }
                None => default,
            },
            ActionKind::Custom(action) => match matches.get_many::<Value>(&dest) {
                Some(values) => {
                    let values: Vec<Value> = values.cloned().collect();
                    action.apply(default, &values).map_err(|message| {
                        clap::Error::raw(
                            ErrorKind::ValueValidation,
                            format!("argument {}: {}\n", spec.names().join("/"), message),
                        )
                        .with_cmd(cmd)
                    })?
                }
                None => default,
            },
        };
        ns.set(dest, value);
    }

    if let Some((name, sub_matches)) = matches.subcommand() {
        let selected = parser.subparser_set().and_then(|set| {
            let child = set.get(name)?;
            Some((set, child, cmd.find_subcommand(name)?))
        });
        if let Some((set, child, sub_cmd)) = selected {
            ns.push_command(name);
            if let Some(dest) = &set.options.dest {
                ns.set(dest.clone(), Value::Str(name.to_string()));
            }
            ns.merge(extract(child, sub_matches, sub_cmd)?);
        }
    }

    Ok(ns)
}
