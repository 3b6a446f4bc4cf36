//! dispatch
//!
//! A framework for programs made of named commands.
//!
//! # Architecture
//!
//! A [`Dispatcher`] owns a registry of [`Command`]s. For each invocation it:
//!
//! 1. Pre-scans the arguments for config files (`-c/--conffile` by default)
//!    and points the root parser at the root section (`main`)
//! 2. Registers the global flags `--debug` and `-q/--quiet`
//! 3. Gives every command a sub-parser drawing defaults from the section
//!    named after the command, and lets the command add its arguments
//! 4. Parses the remaining arguments, runs the selected command, then its
//!    [`Command::callback`] hook
//!
//! Building happens per invocation because defaults are read from the
//! config files named on that command line.
//!
//! # Example
//!
//! ```no_run
//! use argconf::dispatch::{Command, Dispatcher, Invocation};
//!
//! struct Hello;
//!
//! impl Command for Hello {
//!     fn name(&self) -> &str {
//!         "hello"
//!     }
//!
//!     fn run(&self, _inv: &Invocation<'_>) -> anyhow::Result<()> {
//!         println!("hello");
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new("prog").register(Hello);
//! dispatcher.run(std::env::args().skip(1)).unwrap();
//! ```

use thiserror::Error;

use crate::core::config::ConfigStore;
use crate::parser::{
    ActionKind, ArgumentParser, ArgumentSpec, Namespace, ParserError, PrescanOptions,
    SourceOptions, SubparsersOptions,
};

/// Section the root parser draws defaults from.
pub const ROOT_SECTION: &str = "main";

/// Errors from building or parsing a command line.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The parser tree could not be built (bad config file, bad default).
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// The command line was rejected, or help was requested.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    #[error("no command selected")]
    NoCommand,
}

/// A named command.
pub trait Command {
    /// Name on the command line, and the config section for its defaults.
    fn name(&self) -> &str;

    /// One-line description for help output.
    fn about(&self) -> &str {
        ""
    }

    /// Register the command's arguments on its sub-parser.
    fn configure(&self, _parser: &mut ArgumentParser) -> Result<(), ParserError> {
        Ok(())
    }

    fn run(&self, inv: &Invocation<'_>) -> anyhow::Result<()>;

    /// Called after a successful [`run`](Command::run) with the same
    /// invocation. Not called when `run` fails.
    fn callback(&self, _inv: &Invocation<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What a command sees when it runs.
#[derive(Debug)]
pub struct Invocation<'a> {
    /// Parsed values of the root and the selected command.
    pub args: &'a Namespace,
    /// The root of the parser tree the arguments were parsed with.
    pub parser: &'a ArgumentParser,
}

impl Invocation<'_> {
    /// The merged configuration files.
    pub fn store(&self) -> Option<&ConfigStore> {
        self.parser.config_store().map(|s| s.as_ref())
    }
}

/// A parsed command line with the tree that parsed it.
#[derive(Debug)]
pub struct Parsed {
    pub parser: ArgumentParser,
    pub args: Namespace,
}

/// Command registry and entry point.
pub struct Dispatcher {
    prog: String,
    about: Option<String>,
    commands: Vec<Box<dyn Command>>,
    config_flags: Vec<String>,
    root_section: String,
}

impl Dispatcher {
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            about: None,
            commands: Vec::new(),
            config_flags: vec!["-c".to_string(), "--conffile".to_string()],
            root_section: ROOT_SECTION.to_string(),
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Option strings naming a config file.
    pub fn config_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Section for the root parser's defaults (default `main`).
    pub fn root_section(mut self, section: impl Into<String>) -> Self {
        self.root_section = section.into();
        self
    }

    pub fn register(mut self, command: impl Command + 'static) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// Registered command names in order.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Build the parser tree for `args` and parse them.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Parser`] if config files cannot be read or a
    ///   configured default does not convert
    /// - [`DispatchError::Parse`] for clap's parse failures and help
    ///   requests
    pub fn parse<I, T>(&self, args: I) -> Result<Parsed, DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut parser = ArgumentParser::new(self.prog.as_str()).add_help(false);
        if let Some(about) = &self.about {
            parser.set_about(about.as_str());
        }

        let prescan = parser.add_and_parse_config_files(
            args,
            PrescanOptions::new()
                .flags(self.config_flags.iter().cloned())
                .section(self.root_section.as_str())
                .add_to_self(true),
        )?;

        parser.add_argument(
            ArgumentSpec::new(["--debug"])
                .action(ActionKind::StoreTrue)
                .help("Show debug output"),
        )?;
        parser.add_argument(
            ArgumentSpec::new(["-q", "--quiet"])
                .action(ActionKind::StoreTrue)
                .help("Only print errors"),
        )?;

        {
            let mut subs = parser.add_subparsers(SubparsersOptions::new().title("Commands"))?;
            for command in &self.commands {
                let sub = subs.add_parser(command.name(), SourceOptions::new().section(command.name()))?;
                if !command.about().is_empty() {
                    sub.set_about(command.about());
                }
                command.configure(sub)?;
            }
        }

        let mut args = parser.try_parse_args(prescan.remaining)?;
        args.merge(prescan.parsed);
        tracing::debug!(command = ?args.command(), "parsed command line");
        Ok(Parsed { parser, args })
    }

    /// Run the command selected in `parsed`.
    pub fn invoke(&self, parsed: &Parsed) -> anyhow::Result<()> {
        let name = parsed.args.command().ok_or(DispatchError::NoCommand)?;
        let command = self
            .commands
            .iter()
            .find(|c| c.name() == name)
            .ok_or(DispatchError::NoCommand)?;
        let inv = Invocation {
            args: &parsed.args,
            parser: &parsed.parser,
        };
        command.run(&inv)?;
        command.callback(&inv)
    }

    /// Parse `args` and run the selected command.
    ///
    /// Parse failures and help requests print and exit as clap does.
    pub fn run<I, T>(&self, args: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.parse(args) {
            Ok(parsed) => self.invoke(&parsed),
            Err(DispatchError::Parse(e)) => e.exit(),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prog", &self.prog)
            .field("commands", &self.command_names())
            .field("config_flags", &self.config_flags)
            .field("root_section", &self.root_section)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::ValueType;
    use std::sync::{Arc, Mutex};

    /// Records the `level` value it was run with.
    struct Recorder {
        seen: Arc<Mutex<Vec<i64>>>,
    }

    impl Command for Recorder {
        fn name(&self) -> &str {
            "record"
        }

        fn about(&self) -> &str {
            "Record the level"
        }

        fn configure(&self, parser: &mut ArgumentParser) -> Result<(), ParserError> {
            parser.add_argument(
                ArgumentSpec::new(["--level"])
                    .value_type(ValueType::Integer)
                    .default_value(1i64),
            )?;
            Ok(())
        }

        fn run(&self, inv: &Invocation<'_>) -> anyhow::Result<()> {
            let level = inv.args.get_int("level").unwrap_or_default();
            self.seen.lock().unwrap().push(level);
            Ok(())
        }
    }

    struct Noop;

    impl Command for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        fn run(&self, _inv: &Invocation<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<Mutex<Vec<i64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let d = Dispatcher::new("test")
            .register(Recorder { seen: Arc::clone(&seen) })
            .register(Noop);
        (d, seen)
    }

    #[test]
    fn runs_selected_command() {
        let (d, seen) = dispatcher();
        d.run(["record", "--level", "4"]).unwrap();
        d.run(["record"]).unwrap();
        d.run(["noop"]).unwrap();
        assert_eq!(*seen.lock().unwrap(), [4, 1]);
    }

    #[test]
    fn global_flags_recorded() {
        let (d, _) = dispatcher();
        let parsed = d.parse(["--debug", "noop"]).unwrap();
        assert_eq!(parsed.args.get_bool("debug"), Some(true));
        assert_eq!(parsed.args.get_bool("quiet"), Some(false));
        assert_eq!(parsed.args.command(), Some("noop"));
        assert!(parsed.args.get_strings("conffile").is_empty());
    }

    #[test]
    fn missing_and_unknown_commands_are_parse_errors() {
        let (d, _) = dispatcher();
        assert!(matches!(
            d.parse(Vec::<String>::new()),
            Err(DispatchError::Parse(e)) if e.kind() == clap::error::ErrorKind::MissingSubcommand
        ));
        assert!(matches!(
            d.parse(["nope"]),
            Err(DispatchError::Parse(e)) if e.kind() == clap::error::ErrorKind::InvalidSubcommand
        ));
    }

    #[test]
    fn missing_config_file_is_builder_error() {
        let (d, _) = dispatcher();
        let err = d.parse(["-c", "/nonexistent/argconf.cfg", "noop"]).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Parser(ParserError::ConfigFileReadFailure { .. })
        ));
    }

    #[test]
    fn command_section_supplies_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = dir.path().join("app.cfg");
        std::fs::write(&cfg, "[main]\nquiet = true\n[record]\nlevel = 7\n").unwrap();
        let cfg = cfg.to_string_lossy().into_owned();

        let (d, seen) = dispatcher();
        let parsed = d.parse(["record", "-c", cfg.as_str()]).unwrap();
        assert_eq!(parsed.args.get_bool("quiet"), Some(true));
        assert_eq!(parsed.args.get_int("level"), Some(7));
        assert_eq!(parsed.args.get_strings("conffile"), [cfg.clone()]);
        assert!(Invocation {
            args: &parsed.args,
            parser: &parsed.parser
        }
        .store()
        .unwrap()
        .has_section("record"));

        d.invoke(&parsed).unwrap();
        d.run(["--conffile", cfg.as_str(), "record", "--level", "2"]).unwrap();
        assert_eq!(*seen.lock().unwrap(), [7, 2]);
    }

    /// Records its run and its post-run hook.
    struct Hooked {
        calls: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    impl Command for Hooked {
        fn name(&self) -> &str {
            "cb"
        }

        fn run(&self, _inv: &Invocation<'_>) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("call");
            if self.fail {
                anyhow::bail!("run failed");
            }
            Ok(())
        }

        fn callback(&self, inv: &Invocation<'_>) -> anyhow::Result<()> {
            assert_eq!(inv.args.command(), Some("cb"));
            self.calls.lock().unwrap().push("cb");
            Ok(())
        }
    }

    #[test]
    fn callback_runs_after_command() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let d = Dispatcher::new("test").register(Hooked {
            calls: Arc::clone(&calls),
            fail: false,
        });
        d.run(["cb"]).unwrap();
        assert_eq!(*calls.lock().unwrap(), ["call", "cb"]);
    }

    #[test]
    fn callback_skipped_when_run_fails() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let d = Dispatcher::new("test").register(Hooked {
            calls: Arc::clone(&calls),
            fail: true,
        });
        assert!(d.run(["cb"]).is_err());
        assert_eq!(*calls.lock().unwrap(), ["call"]);
    }

    #[test]
    fn default_callback_is_noop() {
        let (d, seen) = dispatcher();
        d.run(["record"]).unwrap();
        assert_eq!(*seen.lock().unwrap(), [1]);
    }

    #[test]
    fn invoke_without_command() {
        let (d, _) = dispatcher();
        let parsed = Parsed {
            parser: ArgumentParser::new("test"),
            args: Namespace::new(),
        };
        assert!(d.invoke(&parsed).is_err());
    }
}
