//! ui::output
//!
//! Command output on stdout, notices on stderr.
//!
//! How much is shown follows the `quiet` and `debug` destinations of the
//! parsed command line. Both are ordinary boolean arguments, so either may
//! be switched on from the `[main]` section of a config file.

use std::fmt::Display;

use crate::parser::Namespace;

/// How much a command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    Normal,
    /// Normal output plus `[debug]` notes.
    Debug,
}

impl Verbosity {
    /// `quiet` beats `debug` when both are set.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    /// Read the `quiet` and `debug` destinations of a parsed command line.
    pub fn from_args(args: &Namespace) -> Self {
        Self::from_flags(
            args.get_bool("quiet").unwrap_or(false),
            args.get_bool("debug").unwrap_or(false),
        )
    }

    fn shows(self, level: Verbosity) -> bool {
        self >= level
    }
}

/// A line of command output.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows(Verbosity::Normal) {
        println!("{}", message);
    }
}

pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows(Verbosity::Debug) {
        eprintln!("[debug] {}", message);
    }
}

pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows(Verbosity::Normal) {
        eprintln!("warning: {}", message);
    }
}

/// `key = value` lines in INI layout.
///
/// Multi-line values continue on tab-indented lines so the text reads back
/// as the same value.
pub fn format_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>, indent: &str) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}{} = {}", indent, key, value.replace('\n', "\n\t")));
    }
    out
}
