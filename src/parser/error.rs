//! parser::error
//!
//! Registration-time errors.
//!
//! Everything here is raised while the parser tree is being built, before
//! any command line is parsed. Failures of the final parse are
//! [`clap::Error`]s and keep clap's print-and-exit behaviour.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::value::ConversionError;

/// Errors from building a parser tree.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Mutually exclusive configuration sources were supplied together.
    #[error("Invalid combination of arguments: {0}")]
    InvalidArgumentCombination(String),

    /// A config section was requested but no store is available.
    #[error("No configuration store was provided for section lookup")]
    NoConfigStore,

    /// One or more configuration files could not be read.
    #[error("Failed to read configuration file(s): {}", join_paths(.paths))]
    ConfigFileReadFailure { paths: BTreeSet<PathBuf> },

    /// Reading or resolving configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configured default was rejected by the argument's conversion.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("argument has an empty destination name")]
    EmptyDestination,

    #[error("duplicate destination '{0}'")]
    DuplicateDestination(String),

    #[error("conflicting option string: {0}")]
    ConflictingOption(String),

    #[error("invalid option string '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("cannot have multiple subparser arguments")]
    MultipleSubparsers,

    #[error("duplicate command name '{0}'")]
    DuplicateCommand(String),

    /// A config-file option was given without a file name.
    #[error("argument {0}: expected one argument")]
    MissingValue(String),
}

impl ParserError {
    /// Whether this is a missing-section error from a strict lookup.
    pub fn is_missing_section(&self) -> bool {
        matches!(self, ParserError::Config(ConfigError::MissingSection(_)))
    }
}

fn join_paths(paths: &BTreeSet<PathBuf>) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
