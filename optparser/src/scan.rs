use std::io::Write;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::ResolveError;
use crate::help;
use crate::option::{Kind, OptionRecord, Policy, Value};
use crate::registry::OptionRegistry;

// ============================================================================
// Flow — how a parse run ends
// ============================================================================

/// Returned by a parse run and by error handlers.
///
/// `Exit` stops the scan at once; the caller decides how to end the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    Continue,
    Exit(i32),
}

impl Flow {
    pub fn is_exit(&self) -> bool {
        matches!(self, Flow::Exit(_))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Flow::Continue => None,
            Flow::Exit(code) => Some(*code),
        }
    }
}

/// What an error handler receives for a failed resolution.
#[derive(Debug)]
pub struct ErrorReport<'a> {
    pub option: &'a OptionRecord,
    pub error: ResolveError,
    pub message: String,
    /// Usage line for the failing option.
    pub hint: String,
}

pub type UnmatchedHandler = Arc<dyn Fn(&str) + Send + Sync + 'static>;
pub type ErrorHandler = Arc<dyn Fn(&ErrorReport<'_>) -> Flow + Send + Sync + 'static>;

// ============================================================================
// ValueResolver
// ============================================================================

/// Compute the value an option resolves to, given the token it was matched by
/// and the following token if it was taken as the value.
pub fn resolve_value(
    option: &OptionRecord,
    token: &str,
    candidate: Option<&str>,
) -> Result<Value, ResolveError> {
    let param = option.param();
    let value = match candidate {
        Some(raw) => Some(Value::Str(raw.to_string())),
        None => match (&param.kind, &param.policy) {
            (Kind::Bool, _) => Some(Value::Bool(!token.starts_with("--no-"))),
            (_, Policy::Optional { default: Some(d) }) => Some(Value::Str(d.clone())),
            (_, Policy::Optional { default: None }) | (_, Policy::Unasked) => {
                Some(Value::Bool(true))
            }
            (_, Policy::Required { .. }) => None,
        },
    };
    check(option, value)
}

fn check(option: &OptionRecord, value: Option<Value>) -> Result<Value, ResolveError> {
    let param = option.param();
    let param_name = || param.name.clone().unwrap_or_default();

    let value = match value {
        Some(value) => value,
        None => {
            return Err(ResolveError::RequiredValueMissing {
                param: param_name(),
                option: option.label().to_string(),
            })
        }
    };

    if param.policy == Policy::Unasked {
        return Ok(value);
    }

    if let Kind::Choice(ref values) = param.kind {
        let allowed = value
            .as_str()
            .is_some_and(|v| values.iter().any(|allowed| allowed == v));
        if !allowed {
            return Err(ResolveError::InvalidChoiceValue {
                param: param_name(),
                option: option.label().to_string(),
                value: value.to_string(),
            });
        }
    }

    Ok(value)
}

/// Write one chunk of output, logging rather than failing on I/O errors.
pub(crate) fn emit<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = writeln!(out, "{}", text) {
        warn!(error = %e, "failed to write parser output");
    }
}

// ============================================================================
// ArgumentScanner
// ============================================================================

pub(crate) struct Scanner<'a, W> {
    pub(crate) registry: &'a OptionRegistry,
    pub(crate) banner: Option<&'a str>,
    pub(crate) unmatched: Option<&'a UnmatchedHandler>,
    pub(crate) on_error: Option<&'a ErrorHandler>,
    pub(crate) out: &'a mut W,
}

impl<W: Write> Scanner<'_, W> {
    /// One pass over `args` with a single pending slot: a matched option waits
    /// for the next token to learn whether that token is its value.
    pub(crate) fn run<I, S>(&mut self, args: I) -> Flow
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pending: Option<String> = None;

        for arg in args {
            let token = arg.as_ref();
            let is_option = self.registry.contains(token);
            trace!(token, is_option, "scan");

            if let Some(key) = pending.take() {
                let takes_value = self
                    .registry
                    .get(&key)
                    .is_some_and(|o| o.param().policy != Policy::Unasked);

                if takes_value {
                    let candidate = if is_option { None } else { Some(token) };
                    let flow = self.resolve(&key, candidate);
                    if flow.is_exit() {
                        return flow;
                    }
                    if is_option {
                        pending = Some(token.to_string());
                    }
                    continue;
                }

                let flow = self.resolve(&key, None);
                if flow.is_exit() {
                    return flow;
                }
            }

            if is_option {
                pending = Some(token.to_string());
            } else if token == "-h" || token == "--help" {
                emit(&mut *self.out, &help::render(self.banner, self.registry));
                return Flow::Exit(0);
            } else if let Some(handler) = self.unmatched {
                handler(token);
            }
        }

        match pending {
            Some(key) => self.resolve(&key, None),
            None => Flow::Continue,
        }
    }

    fn resolve(&mut self, token: &str, candidate: Option<&str>) -> Flow {
        let registry = self.registry;
        let Some(option) = registry.get(token) else {
            return Flow::Continue;
        };
        let Some(callback) = option.callback() else {
            debug!(option = token, "no callback registered");
            return Flow::Continue;
        };

        match resolve_value(option, token, candidate) {
            Ok(value) => {
                debug!(option = token, value = %value, "resolved");
                callback(value);
                Flow::Continue
            }
            Err(error) => self.report(option, error),
        }
    }

    fn report(&mut self, option: &OptionRecord, error: ResolveError) -> Flow {
        let report = ErrorReport {
            option,
            message: error.to_string(),
            hint: help::hint(option),
            error,
        };
        debug!(option = option.label(), message = %report.message, "resolution failed");

        match self.on_error {
            Some(handler) => handler(&report),
            None => {
                emit(&mut *self.out, &format!("{}\n\n{}", report.message, report.hint));
                Flow::Exit(1)
            }
        }
    }
}
