//! core::config::ini
//!
//! INI documents, read with `rust-ini`.
//!
//! # Format
//!
//! ```ini
//! [DEFAULT]
//! root = /srv
//!
//! [main]
//! ; full-line comment
//! # another comment
//! int = 1
//! path: %(root)s/data   ; inline comment
//! motd = first line
//!     continued line
//! ```
//!
//! - Section headers are case-sensitive.
//! - Keys are lower-cased and trimmed; values are trimmed.
//! - `=` or `:` separates key and value.
//! - Indented lines continue the previous value, joined with a newline.
//!   An indented line starting with `;` or `#` is part of the value.
//! - Quotes and backslashes are kept as written.

use ini::{Ini, ParseOption};

use super::ConfigSection;

/// A document that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniParseError {
    /// 1-based line, when the reader knows it.
    pub line: Option<usize>,
    pub message: String,
}

/// The sections of one INI document, in order of first appearance.
///
/// A section header that appears twice merges into the first occurrence.
#[derive(Debug, Default, PartialEq)]
pub struct IniDocument {
    pub sections: Vec<(String, ConfigSection)>,
}

impl IniDocument {
    fn section_mut(&mut self, name: &str) -> &mut ConfigSection {
        let idx = match self.sections.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.sections.push((name.to_string(), ConfigSection::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx].1
    }
}

fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        enabled_indented_mutiline_value: true,
        ..ParseOption::default()
    }
}

/// Parse INI text.
///
/// Options placed before the first section header are rejected.
pub fn parse(content: &str) -> Result<IniDocument, IniParseError> {
    let ini = Ini::load_from_str_opt(content, parse_option()).map_err(|e| IniParseError {
        line: Some(e.line),
        message: e.msg.to_string(),
    })?;

    let mut doc = IniDocument::default();
    for (name, props) in ini.iter() {
        let Some(name) = name else {
            if let Some((key, _)) = props.iter().next() {
                return Err(IniParseError {
                    line: None,
                    message: format!("option outside of any section: {}", key),
                });
            }
            continue;
        };
        let section = doc.section_mut(name);
        for (key, value) in props.iter() {
            section.insert(key.trim().to_lowercase(), value.trim());
        }
    }
    Ok(doc)
}
