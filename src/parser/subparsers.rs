//! parser::subparsers
//!
//! Sub-commands.
//!
//! Each sub-parser is a full [`ArgumentParser`]. It inherits the parent's
//! config store and missing-section policy but not its section: a
//! sub-parser draws no defaults unless given its own section or mapping.

use super::error::ParserError;
use super::source::{self, SourceOptions};
use super::ArgumentParser;

/// Options for a sub-command set.
#[derive(Debug, Clone)]
pub struct SubparsersOptions {
    pub(crate) title: Option<String>,
    pub(crate) dest: Option<String>,
    pub(crate) required: bool,
}

impl Default for SubparsersOptions {
    fn default() -> Self {
        Self {
            title: None,
            dest: None,
            required: true,
        }
    }
}

impl SubparsersOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heading for the command list in help output.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Store the selected command name under this destination.
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Whether a command must be given (default: true).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SubparserEntry {
    pub parser: ArgumentParser,
    pub aliases: Vec<String>,
}

/// The sub-commands of one parser.
#[derive(Debug, Clone)]
pub(crate) struct SubparserSet {
    pub options: SubparsersOptions,
    pub entries: Vec<SubparserEntry>,
}

impl SubparserSet {
    pub fn new(options: SubparsersOptions) -> Self {
        Self {
            options,
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.parser.name() == name || e.aliases.iter().any(|a| a == name))
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentParser> {
        self.position(name).map(|i| &self.entries[i].parser)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArgumentParser> {
        self.position(name).map(|i| &mut self.entries[i].parser)
    }
}

/// Handle for adding sub-parsers.
///
/// Obtained from [`ArgumentParser::add_subparsers`] or
/// [`ArgumentParser::subparsers`].
#[derive(Debug)]
pub struct Subparsers<'p> {
    parent: &'p mut ArgumentParser,
}

impl<'p> Subparsers<'p> {
    pub(crate) fn new(parent: &'p mut ArgumentParser) -> Self {
        Self { parent }
    }

    /// Add a sub-parser for `name`.
    ///
    /// The parent's store is used unless `opts` supplies one.
    pub fn add_parser(
        &mut self,
        name: &str,
        opts: SourceOptions,
    ) -> Result<&mut ArgumentParser, ParserError> {
        self.add_parser_with_aliases(name, &[], opts)
    }

    /// Add a sub-parser reachable under `name` and each alias.
    pub fn add_parser_with_aliases(
        &mut self,
        name: &str,
        aliases: &[&str],
        opts: SourceOptions,
    ) -> Result<&mut ArgumentParser, ParserError> {
        let resolved = source::resolve_parser(opts, Some(self.parent.resolved()))?;

        let set = self
            .parent
            .subparser_set_mut()
            .ok_or(ParserError::MultipleSubparsers)?;
        if let Some(taken) = std::iter::once(name)
            .chain(aliases.iter().copied())
            .find(|n| set.get(n).is_some())
        {
            return Err(ParserError::DuplicateCommand(taken.to_string()));
        }

        set.entries.push(SubparserEntry {
            parser: ArgumentParser::with_resolved(name, resolved),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        });
        let last = set.entries.len() - 1;
        Ok(&mut set.entries[last].parser)
    }

    /// Command names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.parent
            .subparser_set()
            .map(|set| set.entries.iter().map(|e| e.parser.name()).collect())
            .unwrap_or_default()
    }
}
