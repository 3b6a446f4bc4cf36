//! parser::group
//!
//! Argument groups.
//!
//! A group is a help heading whose arguments draw defaults from the group's
//! own source. Its arguments are stored on the owning parser, so
//! destination and option conflicts are checked across the whole parser.

use super::argument::ArgumentSpec;
use super::error::ParserError;
use super::ArgumentParser;

/// Handle for registering arguments in a group.
///
/// Obtained from [`ArgumentParser::add_argument_group`] or
/// [`ArgumentParser::argument_group`].
#[derive(Debug)]
pub struct ArgumentGroup<'p> {
    parser: &'p mut ArgumentParser,
    index: usize,
}

impl<'p> ArgumentGroup<'p> {
    pub(crate) fn new(parser: &'p mut ArgumentParser, index: usize) -> Self {
        Self { parser, index }
    }

    /// Register an argument, applying the group's configured default.
    pub fn add_argument(&mut self, spec: ArgumentSpec) -> Result<&ArgumentSpec, ParserError> {
        self.parser.register(spec, Some(self.index))
    }

    pub fn title(&self) -> &str {
        &self.parser.groups()[self.index].title
    }

    /// Text shown under the group heading.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.parser.groups_mut()[self.index].description = Some(description.into());
    }

    pub fn description(&self) -> Option<&str> {
        self.parser.groups()[self.index].description.as_deref()
    }

    /// The mapping this group's arguments draw defaults from.
    pub fn default_source(&self) -> &crate::core::config::ConfigSection {
        &self.parser.groups()[self.index].source
    }

    /// Arguments registered through this group.
    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentSpec> {
        let index = self.index;
        self.parser
            .arguments()
            .iter()
            .filter(move |a| a.group == Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConfigSection;
    use crate::core::value::{Value, ValueType};
    use crate::parser::SourceOptions;

    #[test]
    fn group_uses_parser_source_by_default() {
        let mut parser = ArgumentParser::with_config(
            "prog",
            SourceOptions::new().mapping(ConfigSection::from([("float", "1.5")])),
        )
        .unwrap();
        let mut group = parser
            .add_argument_group("group", SourceOptions::new())
            .unwrap();
        let spec = group
            .add_argument(ArgumentSpec::new(["--float"]).value_type(ValueType::Float))
            .unwrap();
        assert_eq!(spec.effective_default(), Value::Float(1.5));
    }

    #[test]
    fn group_mapping_overrides_parser_source() {
        let mut parser = ArgumentParser::with_config(
            "prog",
            SourceOptions::new().mapping(ConfigSection::from([("float", "1.5")])),
        )
        .unwrap();
        let mut group = parser
            .add_argument_group(
                "group",
                SourceOptions::new().mapping(ConfigSection::from([("float", "2.3")])),
            )
            .unwrap();
        group
            .add_argument(ArgumentSpec::new(["--float"]).value_type(ValueType::Float))
            .unwrap();
        assert_eq!(group.arguments().count(), 1);

        let ns = parser.try_parse_args(Vec::<String>::new()).unwrap();
        assert_eq!(ns.get_float("float"), Some(2.3));
    }

    #[test]
    fn empty_mapping_disables_defaults() {
        let mut parser = ArgumentParser::with_config(
            "prog",
            SourceOptions::new().mapping(ConfigSection::from([("float", "1.5")])),
        )
        .unwrap();
        let mut group = parser
            .add_argument_group("group", SourceOptions::new().mapping(ConfigSection::new()))
            .unwrap();
        assert!(group.default_source().is_empty());
        let spec = group.add_argument(ArgumentSpec::new(["--float"])).unwrap();
        assert_eq!(spec.effective_default(), Value::None);
    }

    #[test]
    fn group_conflicts_checked_against_parser() {
        let mut parser = ArgumentParser::new("prog");
        parser.add_argument(ArgumentSpec::new(["--x"])).unwrap();
        let mut group = parser
            .add_argument_group("group", SourceOptions::new())
            .unwrap();
        assert!(matches!(
            group.add_argument(ArgumentSpec::new(["--x"])),
            Err(ParserError::DuplicateDestination(_))
        ));
    }

    #[test]
    fn reopen_group_by_title() {
        let mut parser = ArgumentParser::new("prog");
        parser
            .add_argument_group("first", SourceOptions::new())
            .unwrap()
            .set_description("first group");
        let mut group = parser.argument_group("first").unwrap();
        assert_eq!(group.title(), "first");
        assert_eq!(group.description(), Some("first group"));
        group.add_argument(ArgumentSpec::new(["--y"])).unwrap();
        assert!(parser.argument_group("second").is_none());
        assert_eq!(parser.arguments().len(), 1);
        assert!(parser.render_help().contains("first: first group"));
    }
}
