use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProviderError;
use crate::status::Status;

/// Status plus evidence returned by a check or validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Reported status.
    pub status: Status,
    /// Descriptive payload carried through to the report unmodified.
    pub evidence: Value,
}

impl Outcome {
    /// Canonical constructor.
    pub fn new(status: Status, evidence: impl Into<Value>) -> Self {
        Self {
            status,
            evidence: evidence.into(),
        }
    }

    /// Shorthand for a PASS outcome.
    pub fn pass(evidence: impl Into<Value>) -> Self {
        Self::new(Status::Pass, evidence)
    }

    /// Shorthand for a WARN outcome.
    pub fn warn(evidence: impl Into<Value>) -> Self {
        Self::new(Status::Warn, evidence)
    }

    /// Shorthand for a FAIL outcome.
    pub fn fail(evidence: impl Into<Value>) -> Self {
        Self::new(Status::Fail, evidence)
    }

    /// Shorthand for a SKIP outcome.
    pub fn skip(evidence: impl Into<Value>) -> Self {
        Self::new(Status::Skip, evidence)
    }

    /// Shorthand for an ERROR outcome.
    pub fn error(evidence: impl Into<Value>) -> Self {
        Self::new(Status::Error, evidence)
    }

    /// Builds an outcome from a status name, rejecting unknown names with
    /// kind `InvalidStatus`.
    pub fn parse(status: &str, evidence: impl Into<Value>) -> Result<Self, ProviderError> {
        let status = status
            .parse::<Status>()
            .map_err(|err| ProviderError::new("InvalidStatus", err.info().message.clone()))?;
        Ok(Self::new(status, evidence))
    }
}

impl TryFrom<Value> for Outcome {
    type Error = ProviderError;

    /// Accepts a raw `[status, evidence]` pair.
    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        match raw {
            Value::Array(mut pair) if pair.len() == 2 => {
                let evidence = pair.pop().unwrap_or(Value::Null);
                match pair.pop() {
                    Some(Value::String(status)) => Outcome::parse(&status, evidence),
                    Some(other) => Err(ProviderError::new(
                        "InvalidStatus",
                        format!("invalid status type '{}'", json_type_name(&other)),
                    )),
                    None => Err(invalid_return("empty array")),
                }
            }
            Value::Array(pair) => Err(invalid_return(&format!(
                "array of length {}",
                pair.len()
            ))),
            other => Err(invalid_return(json_type_name(&other))),
        }
    }
}

fn invalid_return(found: &str) -> ProviderError {
    ProviderError::new(
        "InvalidReturn",
        format!("check must return a (status, evidence) pair, got {found}"),
    )
}

/// JSON type name used in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
