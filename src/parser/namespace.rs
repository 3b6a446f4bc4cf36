//! parser::namespace
//!
//! The result of a parse.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::value::Value;

/// Parsed values keyed by destination name, plus the chain of selected
/// sub-commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Namespace {
    values: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    commands: Vec<String>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    pub fn set(&mut self, dest: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(dest.into(), value.into());
    }

    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    pub fn get_int(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_int)
    }

    pub fn get_float(&self, dest: &str) -> Option<f64> {
        self.get(dest).and_then(Value::as_float)
    }

    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    pub fn get_list(&self, dest: &str) -> Option<&[Value]> {
        self.get(dest).and_then(Value::as_list)
    }

    /// String items of a list value; non-string items are skipped.
    pub fn get_strings(&self, dest: &str) -> Vec<String> {
        self.get_list(dest)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        self.values
    }

    /// Selected sub-commands, outermost first.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// The outermost selected sub-command.
    pub fn command(&self) -> Option<&str> {
        self.commands.first().map(String::as_str)
    }

    pub(crate) fn push_command(&mut self, name: &str) {
        self.commands.push(name.to_string());
    }

    /// Merge another namespace's values; `other` wins on conflict.
    pub(crate) fn merge(&mut self, other: Namespace) {
        self.values.extend(other.values);
        self.commands.extend(other.commands);
    }
}
