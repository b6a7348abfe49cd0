use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::{ConfigError, Result};

// ============================================================================
// Value — what a callback receives
// ============================================================================

/// A resolved option value: either the raw text that followed the option or a
/// boolean for flags and value-less optional options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

pub type OptionCallback = Arc<dyn Fn(Value) + Send + Sync + 'static>;

// ============================================================================
// Kind and Policy
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    String,
    Choice(Vec<String>),
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Pure flag, never consumes a value.
    Unasked,
    Optional {
        default: Option<String>,
    },
    /// A missing value is an error; the default only shows up in help.
    Required {
        default: Option<String>,
    },
}

impl Policy {
    /// The `*default` of a value-taking option.
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Policy::Optional { default } | Policy::Required { default } => default.as_deref(),
            Policy::Unasked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Placeholder as written after the long token. Brackets are stripped
    /// only when they enclose it.
    pub name: Option<String>,
    pub kind: Kind,
    pub policy: Policy,
}

impl Param {
    /// The placeholder as shown in help: `[NAME]` for an optional value.
    pub fn placeholder(&self) -> Option<String> {
        let name = self.name.as_ref()?;
        match self.policy {
            Policy::Optional { .. } if !name.starts_with('[') => Some(format!("[{}]", name)),
            _ => Some(name.clone()),
        }
    }
}

// ============================================================================
// OptionRecord
// ============================================================================

/// One registered option. Immutable once registered.
pub struct OptionRecord {
    abbr: Option<String>,
    full: Option<String>,
    param: Param,
    description: Option<String>,
    callback: Option<OptionCallback>,
}

impl OptionRecord {
    pub fn abbr(&self) -> Option<&str> {
        self.abbr.as_deref()
    }

    /// The long token, without the `[no-]` marker for bool options.
    pub fn full(&self) -> Option<&str> {
        self.full.as_deref()
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn callback(&self) -> Option<&OptionCallback> {
        self.callback.as_ref()
    }

    /// Name used in error messages: the long token without dashes, falling
    /// back to the short one.
    pub fn label(&self) -> &str {
        match (&self.full, &self.abbr) {
            (Some(full), _) => full.strip_prefix("--").unwrap_or(full),
            (None, Some(abbr)) => abbr.strip_prefix('-').unwrap_or(abbr),
            (None, None) => "",
        }
    }

    /// Every token under which this record is registered.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.abbr.as_deref().into_iter().chain(self.full.as_deref())
    }
}

impl fmt::Debug for OptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRecord")
            .field("abbr", &self.abbr)
            .field("full", &self.full)
            .field("param", &self.param)
            .field("description", &self.description)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

// ============================================================================
// Arg — one member of a registration call
// ============================================================================

/// A loosely typed registration argument, classified by shape.
pub enum Arg {
    Text(String),
    Choices(Vec<String>),
    Callback(OptionCallback),
}

/// Wrap a closure as the callback argument of a registration call.
pub fn callback<F>(f: F) -> Arg
where
    F: Fn(Value) + Send + Sync + 'static,
{
    Arg::Callback(Arc::new(f))
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Arg::Choices(v) => f.debug_tuple("Choices").field(v).finish(),
            Arg::Callback(_) => f.write_str("Callback"),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl<const N: usize> From<[&str; N]> for Arg {
    fn from(values: [&str; N]) -> Self {
        Arg::Choices(values.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for Arg {
    fn from(values: &[&str]) -> Self {
        Arg::Choices(values.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<&str>> for Arg {
    fn from(values: Vec<&str>) -> Self {
        Arg::Choices(values.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Arg {
    fn from(values: Vec<String>) -> Self {
        Arg::Choices(values)
    }
}

// ============================================================================
// Classification of a registration call
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Arity {
    Unasked,
    Optional,
    Required,
}

struct Draft {
    abbr: Option<String>,
    full: Option<String>,
    name: Option<String>,
    kind: Kind,
    arity: Arity,
    default: Option<String>,
    description: Option<String>,
    callback: Option<OptionCallback>,
}

impl Draft {
    fn new() -> Self {
        Draft {
            abbr: None,
            full: None,
            name: None,
            kind: Kind::String,
            arity: Arity::Unasked,
            default: None,
            description: None,
            callback: None,
        }
    }

    fn label(&self) -> String {
        self.full
            .clone()
            .or_else(|| self.abbr.clone())
            .unwrap_or_default()
    }

    fn take(&mut self, arg: Arg) -> Result<()> {
        match arg {
            Arg::Choices(values) => {
                if self.kind == Kind::Bool {
                    return Err(ConfigError::ChoiceOnBool(self.label()));
                }
                self.kind = Kind::Choice(values);
            }
            Arg::Callback(f) => self.callback = Some(f),
            Arg::Text(text) => self.take_text(text)?,
        }
        Ok(())
    }

    fn take_text(&mut self, text: String) -> Result<()> {
        if text.starts_with("--") {
            let mut parts = text.split(' ');
            let token = parts.next().unwrap_or_default();
            if let Some(placeholder) = parts.next().filter(|p| !p.is_empty()) {
                let optional = placeholder.starts_with('[');
                self.arity = if optional {
                    Arity::Optional
                } else {
                    Arity::Required
                };
                let bare = placeholder
                    .strip_prefix('[')
                    .and_then(|p| p.strip_suffix(']'))
                    .unwrap_or(placeholder);
                self.name = Some(bare.to_string());
            }
            if let Some(flag) = token.strip_prefix("--[no-]") {
                self.full = Some(format!("--{}", flag));
                if matches!(self.kind, Kind::Choice(_)) {
                    return Err(ConfigError::ChoiceOnBool(self.label()));
                }
                self.kind = Kind::Bool;
            } else {
                self.full = Some(token.to_string());
            }
        } else if text.starts_with('-') {
            self.abbr = Some(text);
        } else if let Some(default) = text.strip_prefix('*') {
            self.default = Some(default.to_string());
        } else {
            self.description = Some(text);
        }
        Ok(())
    }

    fn finish(self) -> Result<OptionRecord> {
        if self.abbr.is_none() && self.full.is_none() {
            return Err(ConfigError::MissingToken);
        }
        match &self.kind {
            Kind::Choice(values) if values.is_empty() => {
                return Err(ConfigError::EmptyChoices(self.label()));
            }
            Kind::Bool => return Err(ConfigError::NegationUnsupported(self.label())),
            _ => {}
        }

        let policy = match self.arity {
            Arity::Optional => Policy::Optional {
                default: self.default,
            },
            Arity::Required => Policy::Required {
                default: self.default,
            },
            Arity::Unasked => {
                if let Some(default) = &self.default {
                    warn!(
                        option = %self.label(),
                        default = %default,
                        "default ignored for option without a value"
                    );
                }
                Policy::Unasked
            }
        };

        Ok(OptionRecord {
            abbr: self.abbr,
            full: self.full,
            param: Param {
                name: self.name,
                kind: self.kind,
                policy,
            },
            description: self.description,
            callback: self.callback,
        })
    }
}

/// Turn the arguments of one registration call into an option record.
///
/// Each argument is classified by shape, in this order: choice list,
/// callback, `--[no-]NAME`, `--NAME [PLACEHOLDER]`, `-X`, `*default`, and
/// finally free text as the description.
pub fn classify<I>(args: I) -> Result<OptionRecord>
where
    I: IntoIterator,
    I::Item: Into<Arg>,
{
    let mut draft = Draft::new();
    for arg in args {
        draft.take(arg.into())?;
    }
    draft.finish()
}

#[cfg(test)]
pub(crate) fn record_for_test(
    abbr: Option<&str>,
    full: Option<&str>,
    param: Param,
    description: Option<&str>,
) -> OptionRecord {
    OptionRecord {
        abbr: abbr.map(str::to_string),
        full: full.map(str::to_string),
        param,
        description: description.map(str::to_string),
        callback: None,
    }
}
