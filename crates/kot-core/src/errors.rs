//! Structured error types shared across kot crates.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detail carried by every [`KotError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Dotted `family.reason` code, stable across releases.
    pub code: String,
    /// Message shown to the user.
    pub message: String,
    /// Identifiers involved: check ids, plugin names, file paths.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested fix, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key=value`; a repeated key keeps the last value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.context.insert(key, value);
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint.replace(hint.into());
        self
    }
}

/// Renders as `message [code] (k=v, ...); hint: ...`.
impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.code)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Canonical error type for the kot engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum KotError {
    /// Provider registration errors (duplicate names, namespace clashes).
    #[error("registry error: {0}")]
    Registry(ErrorInfo),
    /// Fact and fixture resolution errors.
    #[error("resolve error: {0}")]
    Resolve(ErrorInfo),
    /// Wiring defects that abort a whole run.
    #[error("planning error: {0}")]
    Planning(ErrorInfo),
    /// Failures raised while executing a single check instance.
    #[error("execution error: {0}")]
    Execution(ErrorInfo),
    /// Plugin catalog and loading errors.
    #[error("plugin error: {0}")]
    Plugin(ErrorInfo),
    /// Configuration loading errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// JSON encoding or decoding failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl KotError {
    /// Detail shared by every family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            KotError::Registry(info)
            | KotError::Resolve(info)
            | KotError::Planning(info)
            | KotError::Execution(info)
            | KotError::Plugin(info)
            | KotError::Config(info)
            | KotError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Returns whether the error aborts a run rather than a single instance.
    pub fn is_planning(&self) -> bool {
        matches!(self, KotError::Planning(_))
    }
}

/// Error raised by user supplied providers (facts, fixtures, checks, validators).
///
/// The `kind` names the failure class and ends up verbatim in evidence strings
/// such as `exception: <kind>: <message>`. Any [`std::error::Error`] converts
/// into a provider error, so providers can use `?` on foreign results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    /// Failure class, e.g. `RuntimeError`, `InvalidStatus`, `panic`.
    pub kind: String,
    /// Human readable failure message.
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error with an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Converts a panic payload captured by `catch_unwind` into a provider error.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::new("panic", message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl<E: std::error::Error> From<E> for ProviderError {
    fn from(err: E) -> Self {
        Self::new(short_type_name::<E>(), err.to_string())
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
