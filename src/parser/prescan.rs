//! parser::prescan
//!
//! Finding configuration files on the command line before the rest of the
//! parser exists.
//!
//! # Overview
//!
//! [`ArgumentParser::add_and_parse_config_files`] registers a repeatable
//! config-file option, picks its values out of the raw arguments, reads the
//! named files into one [`ConfigStore`] and points the parser at the
//! requested section. Arguments added afterwards take their defaults from
//! those files.
//!
//! The scan only understands the config-file option. Every other token is
//! handed back untouched, in order, for the final parse. It never exits,
//! even when `-h` is present.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::{ConfigStore, SectionSelector};
use crate::core::value::Value;

use super::argument::{ActionKind, ArgumentSpec, OptionName};
use super::error::ParserError;
use super::namespace::Namespace;
use super::ArgumentParser;

/// Options for [`ArgumentParser::add_and_parse_config_files`].
#[derive(Debug, Clone)]
pub struct PrescanOptions {
    flags: Vec<String>,
    section: Option<SectionSelector>,
    add_help: bool,
    add_to_self: bool,
}

impl Default for PrescanOptions {
    fn default() -> Self {
        Self {
            flags: vec!["-c".to_string(), "--conffile".to_string()],
            section: None,
            add_help: true,
            add_to_self: false,
        }
    }
}

impl PrescanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Option strings naming a config file (default `-c`, `--conffile`).
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Section(s) the parser draws defaults from once the files are read.
    pub fn section(mut self, section: impl Into<SectionSelector>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Register `-h/--help` after the files have been read (default: true).
    pub fn add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;
        self
    }

    /// Register the config-file option on the calling parser instead of a
    /// separate one (default: false).
    pub fn add_to_self(mut self, add_to_self: bool) -> Self {
        self.add_to_self = add_to_self;
        self
    }
}

/// Outcome of a config-file pre-scan.
#[derive(Debug)]
pub struct PrescanResult {
    /// The config-file option's destination mapped to the listed paths.
    pub parsed: Namespace,
    /// Every token the scan did not consume, in order.
    pub remaining: Vec<String>,
    /// All listed files merged, later files winning.
    pub store: Arc<ConfigStore>,
    /// The separate parser holding the config-file option, unless it was
    /// added to the calling parser.
    pub parser: Option<ArgumentParser>,
}

impl ArgumentParser {
    /// Register a config-file option, read the files named in `args` and
    /// use them as this parser's configuration.
    ///
    /// # Errors
    ///
    /// - [`ParserError::ConfigFileReadFailure`] naming every file that could
    ///   not be read
    /// - [`ParserError::Config`] if a file is malformed or the section is
    ///   missing on a strict parser
    /// - [`ParserError::MissingValue`] if the option has no file name
    /// - registration errors for the option itself
    pub fn add_and_parse_config_files<I, T>(
        &mut self,
        args: I,
        opts: PrescanOptions,
    ) -> Result<PrescanResult, ParserError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let spec = ArgumentSpec::new(opts.flags.clone())
            .action(ActionKind::Append)
            .default_value(Value::List(Vec::new()))
            .help("Configuration file (can be repeated)")
            .metavar("FILE.cfg");

        let mut detached = if opts.add_to_self {
            None
        } else {
            Some(ArgumentParser::new(self.name()).add_help(false))
        };
        let target = detached.as_mut().unwrap_or(&mut *self);
        let (dest, flags) = {
            let spec = target.add_argument(spec)?;
            (spec.dest(), spec.options().to_vec())
        };

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let (files, remaining) = scan(&args, &flags)?;

        let mut store = ConfigStore::new();
        let read: BTreeSet<PathBuf> = store.read(&files)?.into_iter().collect();
        let unread: BTreeSet<PathBuf> = files
            .iter()
            .map(PathBuf::from)
            .filter(|p| !read.contains(p))
            .collect();
        if !unread.is_empty() {
            return Err(ParserError::ConfigFileReadFailure { paths: unread });
        }
        tracing::debug!(files = files.len(), sections = ?store.sections(), "config files merged");

        let target = detached.as_mut().unwrap_or(&mut *self);
        if opts.add_help && !target.has_help() && target.argument("help").is_none() {
            target.add_argument(
                ArgumentSpec::new(["-h", "--help"])
                    .action(ActionKind::Help)
                    .help("show this help message and exit"),
            )?;
        }

        let store = Arc::new(store);
        self.set_config(Arc::clone(&store), opts.section)?;

        let mut parsed = Namespace::new();
        parsed.set(dest, Value::from(files));
        Ok(PrescanResult {
            parsed,
            remaining,
            store,
            parser: detached,
        })
    }
}

/// Split `args` into config-file values and everything else.
fn scan(args: &[String], flags: &[OptionName]) -> Result<(Vec<String>, Vec<String>), ParserError> {
    let mut files = Vec::new();
    let mut remaining = Vec::new();
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if token == "--" {
            remaining.push(token.clone());
            remaining.extend(tokens.by_ref().cloned());
            break;
        }

        let Some((flag, inline)) = match_flag(token, flags) else {
            remaining.push(token.clone());
            continue;
        };
        let value = match inline {
            Some(value) => value.to_string(),
            None => match tokens.next() {
                Some(next) if !looks_like_option(next) => next.clone(),
                _ => return Err(ParserError::MissingValue(flag.to_string())),
            },
        };
        files.push(value);
    }
    Ok((files, remaining))
}

/// The matching flag and any value attached to the token.
fn match_flag<'a>(token: &'a str, flags: &'a [OptionName]) -> Option<(&'a OptionName, Option<&'a str>)> {
    if let Some(long) = token.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (long, None),
        };
        let flag = flags
            .iter()
            .find(|f| matches!(f, OptionName::Long(l) if l == name))?;
        return Some((flag, inline));
    }

    let short = token.strip_prefix('-')?;
    let c = short.chars().next()?;
    let flag = flags.iter().find(|f| **f == OptionName::Short(c))?;
    let rest = &short[c.len_utf8()..];
    let inline = match rest {
        "" => None,
        rest => Some(rest.strip_prefix('=').unwrap_or(rest)),
    };
    Some((flag, inline))
}

fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}
