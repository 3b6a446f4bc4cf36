//! parser::source
//!
//! Default-source resolution for parsers, sub-parsers and argument groups.
//!
//! # Rules
//!
//! A node may be given a section lookup (against a [`ConfigStore`]) or a
//! literal mapping, never both. When it is given neither:
//!
//! - a parser or sub-parser draws no defaults (empty source)
//! - an argument group uses its parser's source
//!
//! Sub-parsers inherit their parent's store and strictness but not its
//! section.

use std::sync::Arc;

use crate::core::config::{ConfigSection, ConfigStore, SectionSelector};

use super::error::ParserError;

/// Where a node takes its defaults from.
pub type DefaultSource = Arc<ConfigSection>;

/// Configuration options for a parser, sub-parser or argument group.
///
/// ```
/// use argconf::parser::SourceOptions;
///
/// let opts = SourceOptions::new().section("subgroup1");
/// let opts = SourceOptions::new().section(["main", "extra"]).ignore_missing(false);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    pub(crate) store: Option<Arc<ConfigStore>>,
    pub(crate) section: Option<SectionSelector>,
    pub(crate) mapping: Option<ConfigSection>,
    pub(crate) ignore_missing: Option<bool>,
}

impl SourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this store instead of the inherited one.
    pub fn store(mut self, store: Arc<ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Section(s) of the store to draw defaults from.
    pub fn section(mut self, section: impl Into<SectionSelector>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Literal key/value defaults.
    pub fn mapping(mut self, mapping: ConfigSection) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Treat missing sections as empty (default) or fail on them.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = Some(ignore);
        self
    }
}

/// Resolved configuration state of a parser node.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub store: Option<Arc<ConfigStore>>,
    pub source: DefaultSource,
    pub ignore_missing: bool,
}

impl Default for ResolvedSource {
    fn default() -> Self {
        Self {
            store: None,
            source: Arc::new(ConfigSection::new()),
            ignore_missing: true,
        }
    }
}

/// Look up `selector` in `store`.
pub(crate) fn lookup(
    store: Option<&Arc<ConfigStore>>,
    selector: &SectionSelector,
    ignore_missing: bool,
) -> Result<DefaultSource, ParserError> {
    let store = store.ok_or(ParserError::NoConfigStore)?;
    let section = store.resolve(selector, ignore_missing)?;
    tracing::debug!(
        sections = ?selector.names(),
        keys = section.len(),
        "resolved config section"
    );
    Ok(Arc::new(section))
}

/// Resolve a root parser or sub-parser.
///
/// `inherited` carries the parent's store and strictness (absent for a
/// root parser).
pub(crate) fn resolve_parser(
    opts: SourceOptions,
    inherited: Option<&ResolvedSource>,
) -> Result<ResolvedSource, ParserError> {
    if opts.mapping.is_some() && (opts.section.is_some() || opts.store.is_some()) {
        return Err(ParserError::InvalidArgumentCombination(
            "a literal mapping cannot be combined with a config store or section".into(),
        ));
    }

    let store = opts
        .store
        .or_else(|| inherited.and_then(|p| p.store.clone()));
    let ignore_missing = opts
        .ignore_missing
        .or_else(|| inherited.map(|p| p.ignore_missing))
        .unwrap_or(true);

    let source = match (opts.mapping, opts.section) {
        (Some(mapping), _) => Arc::new(mapping),
        (None, Some(selector)) => lookup(store.as_ref(), &selector, ignore_missing)?,
        (None, None) => Arc::new(ConfigSection::new()),
    };

    Ok(ResolvedSource {
        store,
        source,
        ignore_missing,
    })
}

/// Resolve an argument group owned by `parent`.
pub(crate) fn resolve_group(
    opts: SourceOptions,
    parent: &ResolvedSource,
) -> Result<DefaultSource, ParserError> {
    if opts.store.is_some() {
        return Err(ParserError::InvalidArgumentCombination(
            "argument groups use their parser's config store".into(),
        ));
    }
    if opts.ignore_missing.is_some() {
        return Err(ParserError::InvalidArgumentCombination(
            "argument groups use their parser's missing-section policy".into(),
        ));
    }
    match (opts.mapping, opts.section) {
        (Some(_), Some(_)) => Err(ParserError::InvalidArgumentCombination(
            "a literal mapping cannot be combined with a config section".into(),
        )),
        (Some(mapping), None) => Ok(Arc::new(mapping)),
        (None, Some(selector)) => {
            lookup(parent.store.as_ref(), &selector, parent.ignore_missing)
        }
        (None, None) => Ok(Arc::clone(&parent.source)),
    }
}
