//! parser::argument
//!
//! Argument specifications and configuration default injection.
//!
//! # Action kinds
//!
//! | Kind         | Takes value | Platform default | Inferred type |
//! |--------------|-------------|------------------|---------------|
//! | `Store`      | yes         | none             | declared      |
//! | `StoreTrue`  | no          | `false`          | boolean       |
//! | `StoreFalse` | no          | `true`           | boolean       |
//! | `Count`      | no          | `0`              | integer       |
//! | `Append`     | yes         | empty list       | declared      |
//! | `Help`       | no          | (not recorded)   | -             |
//! | `Custom`     | yes         | none             | declared      |
//!
//! Count and boolean actions always convert configured strings with their
//! inferred type; a declared type on those kinds is replaced.

use std::fmt;
use std::sync::Arc;

use crate::core::config::ConfigSection;
use crate::core::value::{ConversionError, Value, ValueType};

use super::error::ParserError;

/// Behaviour for [`ActionKind::Custom`] arguments.
///
/// Values given on the command line are converted with the argument's
/// [`ValueType`] first, then folded into the current value (the default, or
/// the value a previous fold produced).
pub trait CustomAction: Send + Sync {
    /// Short name used in debug output.
    fn name(&self) -> &str;

    /// Combine the current value with the values from the command line.
    fn apply(&self, current: Value, values: &[Value]) -> Result<Value, String>;
}

/// What happens when an argument appears on the command line.
#[derive(Clone, Default)]
pub enum ActionKind {
    /// Store the (converted) value.
    #[default]
    Store,
    /// Presence sets `true`.
    StoreTrue,
    /// Presence sets `false`.
    StoreFalse,
    /// Each occurrence adds one to the default base.
    Count,
    /// Each occurrence appends a value to the default list.
    Append,
    /// Print help and exit.
    Help,
    Custom(Arc<dyn CustomAction>),
}

impl ActionKind {
    /// Whether the action consumes a value token.
    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            ActionKind::Store | ActionKind::Append | ActionKind::Custom(_)
        )
    }

    /// Type forced by the action, overriding any declared type.
    fn inferred_type(&self) -> Option<ValueType> {
        match self {
            ActionKind::Count => Some(ValueType::Integer),
            ActionKind::StoreTrue | ActionKind::StoreFalse => Some(ValueType::Boolean),
            _ => None,
        }
    }

    fn platform_default(&self) -> Value {
        match self {
            ActionKind::StoreTrue => Value::Bool(false),
            ActionKind::StoreFalse => Value::Bool(true),
            ActionKind::Count => Value::Int(0),
            ActionKind::Append => Value::List(Vec::new()),
            _ => Value::None,
        }
    }
}

impl fmt::Debug for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Store => write!(f, "Store"),
            ActionKind::StoreTrue => write!(f, "StoreTrue"),
            ActionKind::StoreFalse => write!(f, "StoreFalse"),
            ActionKind::Count => write!(f, "Count"),
            ActionKind::Append => write!(f, "Append"),
            ActionKind::Help => write!(f, "Help"),
            ActionKind::Custom(action) => f.debug_tuple("Custom").field(&action.name()).finish(),
        }
    }
}

/// A parsed option string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionName {
    /// `-x`
    Short(char),
    /// `--name`
    Long(String),
}

impl OptionName {
    /// Parse an option string such as `-v` or `--verbose`.
    pub fn parse(option: &str) -> Result<Self, ParserError> {
        let invalid = |reason: &str| ParserError::InvalidOption {
            option: option.to_string(),
            reason: reason.to_string(),
        };

        if let Some(long) = option.strip_prefix("--") {
            if long.is_empty() || long.starts_with('-') || long.contains(['=', ' ']) {
                return Err(invalid("long options need a name after '--'"));
            }
            return Ok(OptionName::Long(long.to_string()));
        }
        if let Some(short) = option.strip_prefix('-') {
            let mut chars = short.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c != '-' && !c.is_whitespace() => Ok(OptionName::Short(c)),
                (Some(_), Some(_)) => Err(invalid("single-dash options must be one character")),
                _ => Err(invalid("missing option character")),
            };
        }
        Err(invalid("option strings must start with '-'"))
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionName::Short(c) => write!(f, "-{}", c),
            OptionName::Long(name) => write!(f, "--{}", name),
        }
    }
}

/// A registered (or to-be-registered) argument.
///
/// Built with chained setters and handed to
/// [`ArgumentParser::add_argument`](super::ArgumentParser::add_argument) or
/// [`ArgumentGroup::add_argument`](super::ArgumentGroup::add_argument).
///
/// ```
/// use argconf::parser::{ActionKind, ArgumentSpec};
/// use argconf::core::value::ValueType;
///
/// let spec = ArgumentSpec::new(["-v", "--verbose"]).action(ActionKind::Count);
/// assert_eq!(spec.dest(), "verbose");
///
/// let spec = ArgumentSpec::new(["--max-size"]).value_type(ValueType::Integer);
/// assert_eq!(spec.dest(), "max_size");
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    names: Vec<String>,
    dest: Option<String>,
    action: ActionKind,
    value_type: Option<ValueType>,
    default: Option<Value>,
    help: Option<String>,
    metavar: Option<String>,
    required: Option<bool>,
    options: Vec<OptionName>,
    pub(crate) group: Option<usize>,
}

impl ArgumentSpec {
    /// Create an argument from option strings (`-a`, `--alpha`) or a single
    /// positional name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            dest: None,
            action: ActionKind::Store,
            value_type: None,
            default: None,
            help: None,
            metavar: None,
            required: None,
            options: Vec::new(),
            group: None,
        }
    }

    /// Name the parsed value is stored under.
    pub fn dest(&self) -> String {
        self.dest.clone().unwrap_or_else(|| derive_dest(&self.names))
    }

    /// Override the destination name derived from the option strings.
    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn action_kind(&self) -> &ActionKind {
        &self.action
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn metavar_text(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    /// True when the argument is positional rather than an option.
    pub fn is_positional(&self) -> bool {
        self.names.len() == 1 && !self.names[0].starts_with('-')
    }

    /// Whether the argument must appear on the command line.
    ///
    /// Positionals are required unless declared otherwise.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or_else(|| self.is_positional())
    }

    /// The conversion applied to configured and command-line strings.
    pub fn effective_type(&self) -> ValueType {
        self.action
            .inferred_type()
            .or_else(|| self.value_type.clone())
            .unwrap_or(ValueType::String)
    }

    /// The default in effect: explicit or configured, else the action's
    /// platform default.
    pub fn effective_default(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.action.platform_default())
    }

    /// Parsed option strings; empty for positionals and before
    /// registration.
    pub fn options(&self) -> &[OptionName] {
        &self.options
    }

    /// Check the spec is well-formed and apply action-kind type inference.
    pub(crate) fn validate(&mut self) -> Result<(), ParserError> {
        if self.names.is_empty() {
            return Err(ParserError::EmptyDestination);
        }
        if self.dest().is_empty() {
            return Err(ParserError::EmptyDestination);
        }
        if self.is_positional() {
            if !self.action.takes_value() {
                return Err(ParserError::InvalidOption {
                    option: self.names[0].clone(),
                    reason: format!("positional arguments cannot use {:?}", self.action),
                });
            }
        } else {
            self.options = self
                .names
                .iter()
                .map(|n| OptionName::parse(n))
                .collect::<Result<_, _>>()?;
        }

        if let Some(inferred) = self.action.inferred_type() {
            if let Some(declared) = &self.value_type {
                tracing::debug!(
                    dest = %self.dest(),
                    declared = declared.name(),
                    inferred = inferred.name(),
                    "action kind overrides declared type"
                );
            }
            self.value_type = Some(inferred);
        }
        Ok(())
    }
}

/// Destination name for a set of option strings.
///
/// The first long option wins, else the first short option, else the
/// positional name; dashes become underscores.
pub fn derive_dest(names: &[String]) -> String {
    let chosen = names
        .iter()
        .find_map(|n| n.strip_prefix("--"))
        .or_else(|| names.iter().find_map(|n| n.strip_prefix('-')))
        .or_else(|| names.first().map(String::as_str))
        .unwrap_or_default();
    chosen.replace('-', "_")
}

/// Set the spec's default from a configuration section.
///
/// If the section holds the spec's destination name, the stored string is
/// converted with the spec's effective type and becomes the default;
/// otherwise the default is left as it was. Conversion errors are returned
/// unchanged. Append arguments read a comma-separated list.
pub fn apply_config_default(
    spec: &mut ArgumentSpec,
    section: Option<&ConfigSection>,
) -> Result<(), ConversionError> {
    let Some(section) = section else {
        return Ok(());
    };
    if matches!(spec.action, ActionKind::Help) {
        return Ok(());
    }
    let dest = spec.dest();
    let Some(raw) = section.get(&dest) else {
        return Ok(());
    };

    let value_type = spec.effective_type();
    let value = match spec.action {
        ActionKind::Append => Value::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| value_type.convert(s))
                .collect::<Result<_, _>>()?,
        ),
        _ => value_type.convert(raw)?,
    };

    tracing::debug!(dest = %dest, default = %value, "default from config");
    spec.default = Some(value);
    Ok(())
}
