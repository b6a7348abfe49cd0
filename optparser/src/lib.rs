//! Declarative command-line option parsing.
//!
//! Options are registered with a loosely typed list whose members are
//! classified by shape:
//! - a list of strings makes the option a choice between those values
//! - a [`callback`] receives the resolved [`Value`]
//! - `--name`, `--name VALUE` (required) or `--name [VALUE]` (optional)
//! - `-n` as the short token
//! - `*text` sets the default, used when an optional value is left out
//! - anything else is the description
//!
//! ```
//! use optparser::{args, callback, Flow, OptionParser};
//!
//! let parser = OptionParser::new()
//!     .banner("Usage: demo [options]")
//!     .on(args!["-c", "--choice VALUE", ["a", "b"], "pick one", callback(|v| println!("{}", v))])?
//!     .on(args!["-s", "--switch", "a flag"])?;
//!
//! assert_eq!(parser.parse(["--choice", "a"]), Flow::Continue);
//! # Ok::<(), optparser::ConfigError>(())
//! ```

use std::io::Write;
use std::sync::Arc;

use tracing::debug;

pub mod error;
pub mod help;
pub mod option;
pub mod registry;
pub mod scan;

pub use error::{ConfigError, ResolveError, Result};
pub use option::{callback, Arg, Kind, OptionCallback, OptionRecord, Param, Policy, Value};
pub use registry::OptionRegistry;
pub use scan::{resolve_value, ErrorHandler, ErrorReport, Flow, UnmatchedHandler};

use scan::{emit, Scanner};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a registration list out of heterogeneous members.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}

// ============================================================================
// OptionParser
// ============================================================================

/// Registered options plus the handlers for unmatched tokens and errors.
///
/// Registration consumes and returns the parser; parsing only borrows it, so
/// one parser can be run against any number of argument lists.
pub struct OptionParser {
    banner: Option<String>,
    registry: OptionRegistry,
    unmatched: Option<UnmatchedHandler>,
    on_error: Option<ErrorHandler>,
}

impl OptionParser {
    pub fn new() -> Self {
        OptionParser {
            banner: None,
            registry: OptionRegistry::new(),
            unmatched: None,
            on_error: None,
        }
    }

    /// Text printed above the option list in help output.
    pub fn banner(mut self, text: &str) -> Self {
        self.banner = Some(text.to_string());
        self
    }

    /// Register one option. See the crate docs for how members are classified.
    pub fn on<I>(mut self, args: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let record = option::classify(args)?;
        self.registry.insert(record)?;
        Ok(self)
    }

    /// Handler for tokens that are neither options nor option values.
    pub fn unmatched<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.unmatched = Some(Arc::new(f));
        self
    }

    pub fn clear_unmatched(mut self) -> Self {
        self.unmatched = None;
        self
    }

    /// Handler for resolution errors. Without one, the message and the
    /// option's usage line are printed and the run ends with status 1.
    pub fn error<F>(mut self, f: F) -> Self
    where
        F: Fn(&ErrorReport<'_>) -> Flow + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.on_error = None;
        self
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    /// Parse `args`, writing help and default error output to stdout.
    pub fn parse<I, S>(&self, args: I) -> Flow
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.parse_to(args, &mut out)
    }

    /// Parse the arguments of the current process, minus the program name.
    pub fn parse_env(&self) -> Flow {
        self.parse(std::env::args().skip(1))
    }

    /// Parse `args`, writing help and default error output to `out`.
    pub fn parse_to<I, S, W>(&self, args: I, out: &mut W) -> Flow
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        W: Write,
    {
        let flow = Scanner {
            registry: &self.registry,
            banner: self.banner.as_deref(),
            unmatched: self.unmatched.as_ref(),
            on_error: self.on_error.as_ref(),
            out,
        }
        .run(args);
        debug!(?flow, "parse finished");
        flow
    }

    pub fn render_help(&self) -> String {
        help::render(self.banner.as_deref(), &self.registry)
    }

    pub fn write_help<W: Write>(&self, out: &mut W) {
        emit(out, &self.render_help());
    }

    pub fn print_help(&self) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_help(&mut out);
    }
}

impl Default for OptionParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn capture() -> (Arc<Mutex<Vec<String>>>, impl Fn(Value) + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        (log, move |v: Value| l.lock().unwrap().push(v.to_string()))
    }

    fn reference_parser() -> (OptionParser, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let (choice, on_choice) = capture();
        let (unmatched, _) = capture();
        let u = unmatched.clone();
        let parser = OptionParser::new()
            .banner("\nTesting banner.\n\nOptions:")
            .on(args![
                "-c",
                "--choice VALUE",
                ["opt_a", "opt_b", "opt_c"],
                "selection with predefined options",
                callback(on_choice)
            ])
            .unwrap()
            .on(args![
                "-d",
                "--default [VALUE]",
                "*X",
                "option with optional/default value"
            ])
            .unwrap()
            .on(["-s", "--switch", "simple switch"])
            .unwrap()
            .unmatched(move |t| u.lock().unwrap().push(t.to_string()));
        (parser, choice, unmatched)
    }

    #[test]
    fn registers_and_parses() {
        let (parser, choice, unmatched) = reference_parser();
        let mut out = Vec::new();
        assert_eq!(
            parser.parse_to(["--choice", "opt_b", "loose"], &mut out),
            Flow::Continue
        );
        assert_eq!(*choice.lock().unwrap(), vec!["opt_b"]);
        assert_eq!(*unmatched.lock().unwrap(), vec!["loose"]);
        assert!(out.is_empty());
    }

    #[test]
    fn parses_repeatedly() {
        let (parser, choice, _) = reference_parser();
        let mut out = Vec::new();
        let _ = parser.parse_to(["-c", "opt_a"], &mut out);
        let _ = parser.parse_to(["-c", "opt_c"], &mut out);
        assert_eq!(*choice.lock().unwrap(), vec!["opt_a", "opt_c"]);
    }

    #[test]
    fn duplicate_registration_fails() {
        let err = OptionParser::new()
            .on(["-s", "--switch"])
            .unwrap()
            .on(["-s", "--other"])
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::DuplicateOption("-s".to_string()));
    }

    #[test]
    fn choice_and_bool_fails() {
        let err = OptionParser::new()
            .on(args!["--[no-]color", ["auto", "never"]])
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::ChoiceOnBool("--color".to_string()));
    }

    #[test]
    fn help_output_and_exit() {
        let (parser, choice, _) = reference_parser();
        let mut out = Vec::new();
        let flow = parser.parse_to(["--help", "--choice", "opt_a"], &mut out);
        assert_eq!(flow, Flow::Exit(0));
        assert!(choice.lock().unwrap().is_empty());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", parser.render_help()));
        assert!(text.starts_with("\nTesting banner.\n\nOptions:\n"));
    }

    #[test]
    fn write_help_appends_newline() {
        let parser = OptionParser::new().on(["-v", "--version", "show version"]).unwrap();
        let mut out = Vec::new();
        parser.write_help(&mut out);
        assert_eq!(String::from_utf8(out).unwrap(), "  -v, --version  show version\n");
    }

    #[test]
    fn custom_error_handler_continues() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let e = errors.clone();
        let (parser, choice, _) = reference_parser();
        let parser = parser.error(move |report| {
            e.lock().unwrap().push(report.message.clone());
            Flow::Continue
        });
        let mut out = Vec::new();
        let flow = parser.parse_to(["--choice", "custom", "--choice", "opt_a"], &mut out);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            *errors.lock().unwrap(),
            vec!["Invalid VALUE for \"choice\": custom"]
        );
        assert_eq!(*choice.lock().unwrap(), vec!["opt_a"]);
        assert!(out.is_empty());
    }

    #[test]
    fn cleared_error_handler_restores_default() {
        let (parser, _, _) = reference_parser();
        let parser = parser.error(|_| Flow::Continue).clear_error();
        let mut out = Vec::new();
        assert_eq!(parser.parse_to(["--choice"], &mut out), Flow::Exit(1));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("VALUE required for \"choice\"!\n\n  -c, --choice VALUE  "));
    }

    #[test]
    fn cleared_unmatched_handler_drops_tokens() {
        let (parser, _, unmatched) = reference_parser();
        let parser = parser.clear_unmatched();
        let mut out = Vec::new();
        assert_eq!(parser.parse_to(["loose"], &mut out), Flow::Continue);
        assert!(unmatched.lock().unwrap().is_empty());
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OptionParser>();
    }

    #[test]
    fn version_matches_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(VERSION.split('.').count(), 3);
    }
}
