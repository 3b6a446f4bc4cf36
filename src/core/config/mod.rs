//! core::config
//!
//! Configuration sections and the store that merges them across files.
//!
//! # Overview
//!
//! A [`ConfigStore`] is built by reading zero or more INI files in order.
//! Each file merges into the store:
//!
//! 1. Sections from earlier files are kept
//! 2. A later file's value for the same (section, key) replaces the earlier one
//! 3. New sections are appended in order of first appearance
//!
//! The `[DEFAULT]` section is held apart from the others. Its keys are
//! visible in every section resolved through [`ConfigStore::items`], which
//! also expands `%(name)s` references.
//!
//! # Example
//!
//! ```no_run
//! use argconf::core::config::ConfigStore;
//!
//! let mut store = ConfigStore::new();
//! let read = store.read(&["f1.cfg", "f2.cfg"]).unwrap();
//! println!("read {} file(s)", read.len());
//!
//! let main = store.items("main").unwrap();
//! if let Some(a) = main.get("a") {
//!     println!("a = {}", a);
//! }
//! ```

pub mod ini;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Name of the section whose keys apply to every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Maximum nesting of `%(name)s` references.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// `%%`, `%(name)s`, or a stray `%`.
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:(?P<escape>%)|\((?P<name>[^)]*)\)s)?").expect("valid reference regex")
});

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("No section: '{0}'")]
    MissingSection(String),

    #[error("bad interpolation in section '{section}', option '{key}': {message}")]
    Interpolation {
        section: String,
        key: String,
        message: String,
    },
}

/// Key/value pairs from one configuration section.
///
/// Keys are unique; inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigSection {
    entries: BTreeMap<String, String>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Merge `other` into this section; `other` wins on conflict.
    pub fn merge(&mut self, other: &ConfigSection) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigSection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ConfigSection {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// One or more section names, merged in order with later sections winning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSelector(Vec<String>);

impl SectionSelector {
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for SectionSelector {
    fn from(name: &str) -> Self {
        SectionSelector(vec![name.to_string()])
    }
}

impl From<String> for SectionSelector {
    fn from(name: String) -> Self {
        SectionSelector(vec![name])
    }
}

impl From<Vec<String>> for SectionSelector {
    fn from(names: Vec<String>) -> Self {
        SectionSelector(names)
    }
}

impl From<Vec<&str>> for SectionSelector {
    fn from(names: Vec<&str>) -> Self {
        SectionSelector(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SectionSelector {
    fn from(names: [&str; N]) -> Self {
        SectionSelector(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Sections accumulated from one or more configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    defaults: ConfigSection,
    sections: Vec<(String, ConfigSection)>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration files in order, merging each into the store.
    ///
    /// Files that cannot be opened are skipped; the returned list holds the
    /// paths that were read, so callers can decide whether a missing file is
    /// fatal. A file that opens but fails to parse is an error.
    pub fn read<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<PathBuf>, ConfigError> {
        let mut read = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match fs::read_to_string(path) {
                Ok(content) => {
                    self.read_str(&content, path)?;
                    tracing::debug!(path = %path.display(), "read config file");
                    read.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable config file");
                }
            }
        }
        Ok(read)
    }

    /// Read a single file, failing if it cannot be opened.
    pub fn read_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.read_str(&content, path)
    }

    /// Merge INI text into the store. `origin` is used in error messages.
    pub fn read_str(&mut self, content: &str, origin: &Path) -> Result<(), ConfigError> {
        let doc = ini::parse(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            message: match e.line {
                Some(line) => format!("line {}: {}", line, e.message),
                None => e.message,
            },
        })?;
        for (name, section) in doc.sections {
            self.merge_section(&name, &section);
        }
        Ok(())
    }

    /// Merge key/value pairs into a section, creating it if needed.
    pub fn merge_section(&mut self, name: &str, section: &ConfigSection) {
        if name == DEFAULT_SECTION {
            self.defaults.merge(section);
            return;
        }
        match self.sections.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.merge(section),
            None => self.sections.push((name.to_string(), section.clone())),
        }
    }

    /// Section names in order of first appearance, excluding `DEFAULT`.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|(n, _)| n == name)
    }

    /// The `[DEFAULT]` entries.
    pub fn defaults(&self) -> &ConfigSection {
        &self.defaults
    }

    /// Raw entries of a section, without defaults or interpolation.
    pub fn raw_section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Resolved entries of a section: `DEFAULT` keys, overridden by the
    /// section's own keys, with `%(name)s` references expanded.
    pub fn items(&self, name: &str) -> Result<ConfigSection, ConfigError> {
        let raw = self
            .raw_section(name)
            .ok_or_else(|| ConfigError::MissingSection(name.to_string()))?;

        let mut merged = self.defaults.clone();
        merged.merge(raw);

        merged
            .iter()
            .map(|(key, value)| {
                interpolate(name, key, value, &merged, 0).map(|v| (key.to_string(), v))
            })
            .collect()
    }

    /// Merge several sections in order, later sections winning.
    ///
    /// With `ignore_missing`, absent sections contribute nothing; otherwise
    /// the first absent section is [`ConfigError::MissingSection`].
    pub fn resolve(
        &self,
        selector: &SectionSelector,
        ignore_missing: bool,
    ) -> Result<ConfigSection, ConfigError> {
        let mut resolved = ConfigSection::new();
        for name in selector.names() {
            match self.items(name) {
                Ok(section) => resolved.merge(&section),
                Err(ConfigError::MissingSection(missing)) if ignore_missing => {
                    tracing::warn!(section = %missing, "ignoring missing config section");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolved)
    }
}

fn interpolate(
    section: &str,
    key: &str,
    value: &str,
    vars: &ConfigSection,
    depth: usize,
) -> Result<String, ConfigError> {
    let err = |message: String| ConfigError::Interpolation {
        section: section.to_string(),
        key: key.to_string(),
        message,
    };

    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(err(format!(
            "recursion limit exceeded ({} levels)",
            MAX_INTERPOLATION_DEPTH
        )));
    }

    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in REFERENCE_RE.captures_iter(value) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&value[last..whole.start()]);
        last = whole.end();

        if caps.name("escape").is_some() {
            out.push('%');
        } else if let Some(name) = caps.name("name") {
            let name = name.as_str().to_lowercase();
            let target = vars
                .get(&name)
                .ok_or_else(|| err(format!("no option '{}' to reference", name)))?;
            out.push_str(&interpolate(section, key, target, vars, depth + 1)?);
        } else {
            return Err(err(format!("'%' must be followed by '%' or '(' in '{}'", value)));
        }
    }
    out.push_str(&value[last..]);
    Ok(out)
}
