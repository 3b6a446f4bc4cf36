//! parser
//!
//! Argument parsing with defaults drawn from configuration sections.
//!
//! # Architecture
//!
//! [`ArgumentParser`] owns a tree of argument specifications, argument
//! groups and sub-parsers. Every node has a *default source*: a
//! [`ConfigSection`] consulted when an argument is registered. If the
//! section holds the argument's destination name, the stored string is
//! converted with the argument's type and becomes its default.
//!
//! At parse time the tree is rendered into a [`clap::Command`], so usage,
//! help and error reporting (including exit codes) are clap's.
//!
//! # Precedence
//!
//! For every argument, later overrides earlier:
//! 1. The action's platform default
//! 2. An explicit default on the [`ArgumentSpec`]
//! 3. The node's configuration section
//! 4. The command line
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use argconf::core::config::ConfigSection;
//! use argconf::core::value::ValueType;
//! use argconf::parser::{ArgumentParser, ArgumentSpec, SourceOptions};
//!
//! let main = ConfigSection::from([("int", "1")]);
//! let mut parser =
//!     ArgumentParser::with_config("prog", SourceOptions::new().mapping(main)).unwrap();
//! parser
//!     .add_argument(ArgumentSpec::new(["--int"]).value_type(ValueType::Integer))
//!     .unwrap();
//!
//! let args = parser.try_parse_args(Vec::<String>::new()).unwrap();
//! assert_eq!(args.get_int("int"), Some(1));
//!
//! let args = parser.try_parse_args(["--int", "2"]).unwrap();
//! assert_eq!(args.get_int("int"), Some(2));
//! ```

mod argument;
mod error;
mod group;
mod namespace;
mod prescan;
mod render;
mod source;
mod subparsers;

pub use argument::{
    apply_config_default, derive_dest, ActionKind, ArgumentSpec, CustomAction, OptionName,
};
pub use error::ParserError;
pub use group::ArgumentGroup;
pub use namespace::Namespace;
pub use prescan::{PrescanOptions, PrescanResult};
pub use source::{DefaultSource, SourceOptions};
pub use subparsers::{Subparsers, SubparsersOptions};

use std::ffi::OsString;
use std::sync::Arc;

use crate::core::config::{ConfigSection, ConfigStore, SectionSelector};

use source::ResolvedSource;
use subparsers::SubparserSet;

/// An argument group: a help heading with its own default source.
#[derive(Debug, Clone)]
pub(crate) struct GroupInfo {
    pub title: String,
    pub description: Option<String>,
    pub source: DefaultSource,
}

/// A parser whose argument defaults come from configuration.
///
/// See the [module documentation](self) for the precedence rules.
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    name: String,
    about: Option<String>,
    add_help: bool,
    args: Vec<ArgumentSpec>,
    groups: Vec<GroupInfo>,
    subparsers: Option<SubparserSet>,
    config: ResolvedSource,
}

impl ArgumentParser {
    /// Create a parser with no configuration source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            add_help: true,
            args: Vec::new(),
            groups: Vec::new(),
            subparsers: None,
            config: ResolvedSource::default(),
        }
    }

    /// Create a parser drawing defaults from a store section or a literal
    /// mapping.
    ///
    /// # Errors
    ///
    /// - [`ParserError::InvalidArgumentCombination`] if both a mapping and a
    ///   store or section are given
    /// - [`ParserError::NoConfigStore`] if a section is given without a store
    /// - a missing-section error if the parser is strict
    pub fn with_config(name: impl Into<String>, opts: SourceOptions) -> Result<Self, ParserError> {
        let mut parser = Self::new(name);
        parser.config = source::resolve_parser(opts, None)?;
        Ok(parser)
    }

    pub(crate) fn with_resolved(name: &str, config: ResolvedSource) -> Self {
        let mut parser = Self::new(name);
        parser.config = config;
        parser
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Whether `-h/--help` is registered.
    pub fn add_help(mut self, add_help: bool) -> Self {
        self.add_help = add_help;
        self
    }

    pub fn set_about(&mut self, about: impl Into<String>) {
        self.about = Some(about.into());
    }

    pub fn set_add_help(&mut self, add_help: bool) {
        self.add_help = add_help;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about_text(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn has_help(&self) -> bool {
        self.add_help
    }

    /// Register an argument, applying any configured default.
    ///
    /// # Errors
    ///
    /// - [`ParserError::DuplicateDestination`] / [`ParserError::ConflictingOption`]
    /// - [`ParserError::InvalidOption`] for malformed option strings
    /// - [`ParserError::Conversion`] if the configured default does not
    ///   convert to the argument's type
    pub fn add_argument(&mut self, spec: ArgumentSpec) -> Result<&ArgumentSpec, ParserError> {
        self.register(spec, None)
    }

    pub(crate) fn register(
        &mut self,
        mut spec: ArgumentSpec,
        group: Option<usize>,
    ) -> Result<&ArgumentSpec, ParserError> {
        spec.validate()?;

        let dest = spec.dest();
        if self.args.iter().any(|a| a.dest() == dest) {
            return Err(ParserError::DuplicateDestination(dest));
        }
        if let Some(taken) = spec.options().iter().find(|o| self.option_in_use(o)) {
            return Err(ParserError::ConflictingOption(taken.to_string()));
        }

        let source = match group {
            Some(idx) => Arc::clone(&self.groups[idx].source),
            None => Arc::clone(&self.config.source),
        };
        apply_config_default(&mut spec, Some(&source))?;

        spec.group = group;
        self.args.push(spec);
        Ok(&self.args[self.args.len() - 1])
    }

    fn option_in_use(&self, option: &OptionName) -> bool {
        let help = match option {
            OptionName::Short(c) => *c == 'h',
            OptionName::Long(name) => name == "help",
        };
        (self.add_help && help) || self.args.iter().any(|a| a.options().contains(option))
    }

    /// Add an argument group with its own default source.
    ///
    /// Without a section or mapping the group shares this parser's source.
    pub fn add_argument_group(
        &mut self,
        title: impl Into<String>,
        opts: SourceOptions,
    ) -> Result<ArgumentGroup<'_>, ParserError> {
        let source = source::resolve_group(opts, &self.config)?;
        self.groups.push(GroupInfo {
            title: title.into(),
            description: None,
            source,
        });
        let index = self.groups.len() - 1;
        Ok(ArgumentGroup::new(self, index))
    }

    /// Reopen a group by title.
    pub fn argument_group(&mut self, title: &str) -> Option<ArgumentGroup<'_>> {
        let index = self.groups.iter().position(|g| g.title == title)?;
        Some(ArgumentGroup::new(self, index))
    }

    /// Add the sub-command set. Only one set is allowed per parser.
    pub fn add_subparsers(
        &mut self,
        opts: SubparsersOptions,
    ) -> Result<Subparsers<'_>, ParserError> {
        if self.subparsers.is_some() {
            return Err(ParserError::MultipleSubparsers);
        }
        self.subparsers = Some(SubparserSet::new(opts));
        Ok(Subparsers::new(self))
    }

    /// Reopen the sub-command set.
    pub fn subparsers(&mut self) -> Option<Subparsers<'_>> {
        self.subparsers.as_ref()?;
        Some(Subparsers::new(self))
    }

    /// A sub-parser by command name.
    pub fn subparser(&self, name: &str) -> Option<&ArgumentParser> {
        self.subparsers.as_ref()?.get(name)
    }

    pub fn subparser_mut(&mut self, name: &str) -> Option<&mut ArgumentParser> {
        self.subparsers.as_mut()?.get_mut(name)
    }

    /// Set or replace the store and section this parser draws from.
    ///
    /// Only arguments registered afterwards see the new source.
    pub fn set_config(
        &mut self,
        store: Arc<ConfigStore>,
        section: Option<SectionSelector>,
    ) -> Result<(), ParserError> {
        let source = match &section {
            Some(selector) => source::lookup(Some(&store), selector, self.config.ignore_missing)?,
            None => Arc::new(ConfigSection::new()),
        };
        self.config.store = Some(store);
        self.config.source = source;
        Ok(())
    }

    /// Resolve sections against this parser's store with its
    /// missing-section policy.
    pub fn get_config_section(
        &self,
        section: impl Into<SectionSelector>,
    ) -> Result<ConfigSection, ParserError> {
        let source = source::lookup(
            self.config.store.as_ref(),
            &section.into(),
            self.config.ignore_missing,
        )?;
        Ok((*source).clone())
    }

    pub fn config_store(&self) -> Option<&Arc<ConfigStore>> {
        self.config.store.as_ref()
    }

    /// The mapping arguments registered on this parser draw defaults from.
    pub fn default_source(&self) -> &ConfigSection {
        &self.config.source
    }

    pub fn ignore_missing(&self) -> bool {
        self.config.ignore_missing
    }

    pub(crate) fn resolved(&self) -> &ResolvedSource {
        &self.config
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.args
    }

    pub fn argument(&self, dest: &str) -> Option<&ArgumentSpec> {
        self.args.iter().find(|a| a.dest() == dest)
    }

    pub(crate) fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [GroupInfo] {
        &mut self.groups
    }

    pub(crate) fn subparser_set(&self) -> Option<&SubparserSet> {
        self.subparsers.as_ref()
    }

    pub(crate) fn subparser_set_mut(&mut self) -> Option<&mut SubparserSet> {
        self.subparsers.as_mut()
    }

    /// Render the tree as a clap command.
    pub fn command(&self) -> clap::Command {
        render::build_command(self, &self.name)
    }

    /// Help text as printed by `--help`.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Parse `args` (without the program name).
    ///
    /// # Errors
    ///
    /// Returns clap's error for unknown flags, invalid values, missing
    /// required arguments or sub-commands, and help requests
    /// ([`clap::error::ErrorKind::DisplayHelp`]).
    pub fn try_parse_args<I, T>(&self, args: I) -> Result<Namespace, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = self.command();
        let argv = std::iter::once(OsString::from(&self.name))
            .chain(args.into_iter().map(Into::into));
        let matches = cmd.try_get_matches_from_mut(argv)?;
        render::extract(self, &matches, &cmd)
    }

    /// Parse `args`, printing help or errors and exiting the process as clap
    /// does: status 0 for help, 2 for parse failures.
    pub fn parse_args<I, T>(&self, args: I) -> Namespace
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.try_parse_args(args).unwrap_or_else(|e| e.exit())
    }

    /// Parse the process arguments.
    pub fn parse_env(&self) -> Namespace {
        self.parse_args(std::env::args_os().skip(1))
    }
}
