//! Reusable validators and combinators for use inside check bodies.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use kot_core::value::{render_evidence, repr};
use kot_core::{Outcome, ProviderError, Status, Value};

type ValidateFn = Box<dyn Fn(&Value) -> Result<Outcome, ProviderError>>;

/// Named validation applied to a target value.
pub struct Validator {
    name: String,
    f: ValidateFn,
}

impl Validator {
    /// Validator `name` applying `f`.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Outcome, ProviderError> + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }

    /// Name used in error evidence.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the validator. Errors and panics become an ERROR outcome
    /// naming the validator.
    pub fn apply(&self, target: &Value) -> Outcome {
        let result = catch_unwind(AssertUnwindSafe(|| (self.f)(target)))
            .unwrap_or_else(|payload| Err(ProviderError::from_panic(payload.as_ref())));
        result.unwrap_or_else(|err| {
            Outcome::error(format!("validator={} error={err}", self.name))
        })
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn worst(outcomes: Vec<Outcome>) -> Outcome {
    let status = outcomes
        .iter()
        .map(|outcome| outcome.status)
        .max_by_key(|status| status.validator_rank())
        .unwrap_or(Status::Pass);
    let evidence: Vec<String> = outcomes
        .iter()
        .map(|outcome| render_evidence(&outcome.evidence))
        .collect();
    Outcome::new(status, evidence.join("; "))
}

/// Runs every validator against `target`.
///
/// With `fail_fast` the first FAIL or ERROR is returned unchanged. Otherwise
/// the most severe status wins and evidences are joined with `"; "`. When
/// several validators all pass the evidence is `target=<repr> ok`; a single
/// validator's outcome passes through.
pub fn check_all(target: &Value, validators: &[Validator], fail_fast: bool) -> Outcome {
    let mut outcomes = Vec::with_capacity(validators.len());
    for validator in validators {
        let outcome = validator.apply(target);
        if fail_fast && outcome.status.is_failure() {
            return outcome;
        }
        outcomes.push(outcome);
    }
    if outcomes.len() == 1 {
        return outcomes.remove(0);
    }
    if outcomes.iter().all(|outcome| outcome.status == Status::Pass) {
        return Outcome::pass(format!("target={} ok", repr(target)));
    }
    worst(outcomes)
}

/// Passes on the first validator that passes; otherwise returns the most
/// severe outcome with every evidence joined.
pub fn any_of(target: &Value, validators: &[Validator]) -> Outcome {
    if validators.is_empty() {
        return Outcome::fail(format!("target={} no validators", repr(target)));
    }
    let mut outcomes = Vec::with_capacity(validators.len());
    for validator in validators {
        let outcome = validator.apply(target);
        if outcome.status == Status::Pass {
            return outcome;
        }
        outcomes.push(outcome);
    }
    worst(outcomes)
}
