//! Integration tests for the configuration-aware parser.
//!
//! Scenarios mirror how a program uses the library: a store built from
//! files, a root parser on one section, and groups and sub-parsers on
//! others.

use std::path::Path;
use std::sync::Arc;

use argconf::core::config::{ConfigSection, ConfigStore, SectionSelector};
use argconf::core::value::{Value, ValueType};
use argconf::parser::{
    ArgumentParser, ArgumentSpec, ParserError, PrescanOptions, SourceOptions, SubparsersOptions,
};
use clap::error::ErrorKind;
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

const FIXTURE: &str = "\
[main]
int = 1

[subparser1]
string = a string

[subgroup1]
float = 2.3
";

fn store() -> Arc<ConfigStore> {
    let mut store = ConfigStore::new();
    store.read_str(FIXTURE, Path::new("fixture.cfg")).unwrap();
    Arc::new(store)
}

/// How a node gets its defaults: literal mappings or store sections.
#[derive(Clone, Copy, Debug)]
enum Source {
    Mapping,
    Store,
}

fn opts(source: Source, section: &str, store: &Arc<ConfigStore>, root: bool) -> SourceOptions {
    match source {
        Source::Mapping => SourceOptions::new().mapping(store.items(section).unwrap()),
        Source::Store if root => SourceOptions::new().store(Arc::clone(store)).section(section),
        Source::Store => SourceOptions::new().section(section),
    }
}

fn no_args() -> Vec<String> {
    Vec::new()
}

// =============================================================================
// Argument groups
// =============================================================================

fn group_parser(source: Source) -> ArgumentParser {
    let store = store();
    let mut parser =
        ArgumentParser::with_config("prog", opts(source, "main", &store, true)).unwrap();
    parser
        .add_argument(ArgumentSpec::new(["--int"]).value_type(ValueType::Integer))
        .unwrap();
    parser
        .add_argument_group("subgroup1", opts(source, "subgroup1", &store, false))
        .unwrap()
        .add_argument(ArgumentSpec::new(["--float"]).value_type(ValueType::Float))
        .unwrap();
    parser
}

#[test]
fn subgroup_defaults_without_arguments() {
    for source in [Source::Mapping, Source::Store] {
        let ns = group_parser(source).try_parse_args(no_args()).unwrap();
        assert_eq!(ns.get_int("int"), Some(1), "{:?}", source);
        assert_eq!(ns.get_float("float"), Some(2.3), "{:?}", source);
        assert_eq!(ns.values().len(), 2);
    }
}

#[test]
fn subgroup_arguments_override() {
    for source in [Source::Mapping, Source::Store] {
        let ns = group_parser(source)
            .try_parse_args(["--int", "2", "--float", "4.5"])
            .unwrap();
        assert_eq!(ns.get_int("int"), Some(2), "{:?}", source);
        assert_eq!(ns.get_float("float"), Some(4.5), "{:?}", source);
    }
}

// =============================================================================
// Sub-parsers
// =============================================================================

fn subparser_parser(source: Source) -> ArgumentParser {
    let store = store();
    let mut parser =
        ArgumentParser::with_config("prog", opts(source, "main", &store, true)).unwrap();
    parser
        .add_argument(ArgumentSpec::new(["--int"]).value_type(ValueType::Integer))
        .unwrap();

    let mut subs = parser.add_subparsers(SubparsersOptions::new()).unwrap();
    let sub = subs
        .add_parser("subparser1", opts(source, "subparser1", &store, false))
        .unwrap();
    sub.add_argument(ArgumentSpec::new(["--string"])).unwrap();
    sub.add_argument_group("subgroup1", opts(source, "subgroup1", &store, false))
        .unwrap()
        .add_argument(ArgumentSpec::new(["--float"]).value_type(ValueType::Float))
        .unwrap();
    parser
}

#[test]
fn subparser_required() {
    for source in [Source::Mapping, Source::Store] {
        let err = subparser_parser(source).try_parse_args(no_args()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSubcommand);
    }
}

#[test]
fn subparser_defaults_without_sub_arguments() {
    for source in [Source::Mapping, Source::Store] {
        let ns = subparser_parser(source)
            .try_parse_args(["--int", "2", "subparser1"])
            .unwrap();
        assert_eq!(ns.get_int("int"), Some(2));
        assert_eq!(ns.get_str("string"), Some("a string"));
        assert_eq!(ns.get_float("float"), Some(2.3));
        assert_eq!(ns.command(), Some("subparser1"));
    }
}

#[test]
fn subparser_arguments_override() {
    for source in [Source::Mapping, Source::Store] {
        let ns = subparser_parser(source)
            .try_parse_args(["--int", "2", "subparser1", "--string", "zzz", "--float", "4.5"])
            .unwrap();
        assert_eq!(ns.get_int("int"), Some(2));
        assert_eq!(ns.get_str("string"), Some("zzz"));
        assert_eq!(ns.get_float("float"), Some(4.5));
    }
}

#[test]
fn subparser_without_section_has_no_defaults() {
    let mut parser =
        ArgumentParser::with_config("prog", SourceOptions::new().store(store()).section("main"))
            .unwrap();
    parser
        .add_subparsers(SubparsersOptions::new())
        .unwrap()
        .add_parser("plain", SourceOptions::new())
        .unwrap()
        .add_argument(ArgumentSpec::new(["--int"]).value_type(ValueType::Integer))
        .unwrap();
    let ns = parser.try_parse_args(["plain"]).unwrap();
    assert_eq!(ns.get("int"), Some(&Value::None));
}

// =============================================================================
// Store sections and strictness
// =============================================================================

#[test]
fn get_set_config_strictness() {
    for ignore_missing in [true, false] {
        for missing in [true, false] {
            let section = if missing { "missing" } else { "main" };
            let result = ArgumentParser::with_config(
                "prog",
                SourceOptions::new()
                    .store(store())
                    .section(section)
                    .ignore_missing(ignore_missing),
            );
            match (ignore_missing, missing) {
                (false, true) => assert!(result.unwrap_err().is_missing_section()),
                (_, true) => assert!(result.unwrap().default_source().is_empty()),
                (_, false) => assert_eq!(
                    *result.unwrap().default_source(),
                    ConfigSection::from([("int", "1")])
                ),
            }
        }
    }
}

#[test]
fn mapping_with_store_rejected() {
    let result = ArgumentParser::with_config(
        "prog",
        SourceOptions::new()
            .store(store())
            .mapping(ConfigSection::from([("int", "1")])),
    );
    assert!(matches!(result, Err(ParserError::InvalidArgumentCombination(_))));
}

#[test]
fn group_section_without_store_rejected() {
    let mut parser = ArgumentParser::new("prog");
    let result = parser.add_argument_group("g", SourceOptions::new().section("subgroup1"));
    assert!(matches!(result, Err(ParserError::NoConfigStore)));
}

#[test]
fn set_config_replaces_source() {
    let mut parser = ArgumentParser::new("prog");
    parser
        .set_config(store(), Some(SectionSelector::from(["main", "subgroup1"])))
        .unwrap();
    parser
        .add_argument(ArgumentSpec::new(["--float"]).value_type(ValueType::Float))
        .unwrap();
    parser
        .add_argument(ArgumentSpec::new(["--int"]).value_type(ValueType::Integer))
        .unwrap();
    let ns = parser.try_parse_args(no_args()).unwrap();
    assert_eq!(ns.get_float("float"), Some(2.3));
    assert_eq!(ns.get_int("int"), Some(1));
}

// =============================================================================
// Files on disk
// =============================================================================

#[test]
fn later_file_wins_and_sections_union() {
    let dir = TempDir::new().unwrap();
    let f1 = dir.path().join("f1.cfg");
    let f2 = dir.path().join("f2.cfg");
    std::fs::write(&f1, "[main]\na=1\n[subgroup]\nb=2\n").unwrap();
    std::fs::write(&f2, "[subgroup]\nb=3\n").unwrap();
    let f1 = f1.to_string_lossy().into_owned();
    let f2 = f2.to_string_lossy().into_owned();

    let mut parser = ArgumentParser::new("prog").add_help(false);
    let result = parser
        .add_and_parse_config_files(
            ["-c", f1.as_str(), "--conffile", f2.as_str()],
            PrescanOptions::new().section("main"),
        )
        .unwrap();

    assert_eq!(result.store.items("main").unwrap(), ConfigSection::from([("a", "1")]));
    assert_eq!(result.store.items("subgroup").unwrap(), ConfigSection::from([("b", "3")]));

    parser
        .add_argument(ArgumentSpec::new(["-a"]).value_type(ValueType::Integer))
        .unwrap();
    assert_eq!(parser.try_parse_args(result.remaining).unwrap().get_int("a"), Some(1));
}

#[test]
fn defaults_section_and_interpolation() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("app.cfg");
    std::fs::write(
        &cfg,
        "[DEFAULT]\nroot = /srv\n\n[main]\ndata = %(root)s/data\nJobs = 4\n",
    )
    .unwrap();
    let cfg = cfg.to_string_lossy().into_owned();

    let mut parser = ArgumentParser::new("prog");
    let result = parser
        .add_and_parse_config_files(["-c", cfg.as_str()], PrescanOptions::new().section("main"))
        .unwrap();
    parser.add_argument(ArgumentSpec::new(["--data"])).unwrap();
    parser
        .add_argument(ArgumentSpec::new(["--jobs"]).value_type(ValueType::Integer))
        .unwrap();

    let ns = parser.try_parse_args(result.remaining).unwrap();
    assert_eq!(ns.get_str("data"), Some("/srv/data"));
    assert_eq!(ns.get_int("jobs"), Some(4));
}

#[test]
fn malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("bad.cfg");
    std::fs::write(&cfg, "key = value\n").unwrap();
    let cfg = cfg.to_string_lossy().into_owned();

    let mut parser = ArgumentParser::new("prog");
    let err = parser
        .add_and_parse_config_files(["-c", cfg.as_str()], PrescanOptions::new())
        .unwrap_err();
    assert!(matches!(err, ParserError::Config(_)));
}

#[test]
fn bad_boolean_in_file_fails_registration() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("app.cfg");
    std::fs::write(&cfg, "[main]\nverbose = maybe\n").unwrap();
    let cfg = cfg.to_string_lossy().into_owned();

    let mut parser = ArgumentParser::new("prog");
    parser
        .add_and_parse_config_files(["-c", cfg.as_str()], PrescanOptions::new().section("main"))
        .unwrap();
    let err = parser
        .add_argument(
            ArgumentSpec::new(["--verbose"]).action(argconf::parser::ActionKind::StoreTrue),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid boolean string: maybe");
}
