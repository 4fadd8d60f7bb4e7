use kot_core::{ErrorInfo, KotError, ProviderError};
use thiserror::Error;

/// Failure while resolving a fact or building a fixture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Cycle detected in facts: {}", .path.join(" -> "))]
    FactCycle { path: Vec<String> },
    #[error("Cycle detected in fixtures: {}", .path.join(" -> "))]
    FixtureCycle { path: Vec<String> },
    #[error("'{name}' is not registered as a fact or fixture")]
    NotFound { name: String },
    #[error("fixture '{name}' cannot be used where only facts are allowed")]
    FixtureNotAllowed { name: String },
    #[error("fact '{name}' failed: {error}")]
    Provider { name: String, error: ProviderError },
}

impl ResolveError {
    /// Failure class used in evidence strings.
    pub fn kind(&self) -> &str {
        match self {
            ResolveError::FactCycle { .. } | ResolveError::FixtureCycle { .. } => "CycleError",
            ResolveError::NotFound { .. } => "KeyError",
            ResolveError::FixtureNotAllowed { .. } => "TypeError",
            ResolveError::Provider { error, .. } => &error.kind,
        }
    }

    /// Message without the kind prefix. Provider failures pass their own
    /// message through unchanged.
    pub fn message(&self) -> String {
        match self {
            ResolveError::Provider { error, .. } => error.message.clone(),
            other => other.to_string(),
        }
    }

    /// Converts into the error a provider would have returned.
    pub fn into_provider_error(self) -> ProviderError {
        ProviderError::new(self.kind(), self.message())
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::FactCycle { .. } => "resolve.fact_cycle",
            ResolveError::FixtureCycle { .. } => "resolve.fixture_cycle",
            ResolveError::NotFound { .. } => "resolve.not_found",
            ResolveError::FixtureNotAllowed { .. } => "resolve.fixture_not_allowed",
            ResolveError::Provider { .. } => "resolve.provider_failed",
        }
    }
}

impl From<ResolveError> for KotError {
    fn from(err: ResolveError) -> Self {
        KotError::Resolve(ErrorInfo::new(err.code(), err.to_string()))
    }
}

/// Wiring defect that aborts a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("check '{check}': {role} '{name}' is not a registered {expected}")]
    UnknownName {
        check: String,
        role: &'static str,
        name: String,
        expected: &'static str,
    },
    #[error("check '{check}': selector references fixture '{name}'; selectors may only use facts")]
    FixtureInSelector { check: String, name: String },
    #[error("check '{check}': malformed selector '{spec}': empty fact name")]
    MalformedSelector { check: String, spec: String },
    #[error("check '{check}': selector evaluation failed: {cause}")]
    SelectorFailed { check: String, cause: String },
}

impl PlanningError {
    /// Name of the check whose planning failed.
    pub fn check(&self) -> &str {
        match self {
            PlanningError::UnknownName { check, .. }
            | PlanningError::FixtureInSelector { check, .. }
            | PlanningError::MalformedSelector { check, .. }
            | PlanningError::SelectorFailed { check, .. } => check,
        }
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            PlanningError::UnknownName { .. } => "planning.unknown_name",
            PlanningError::FixtureInSelector { .. } => "planning.fixture_in_selector",
            PlanningError::MalformedSelector { .. } => "planning.malformed_selector",
            PlanningError::SelectorFailed { .. } => "planning.selector_failed",
        }
    }
}

impl From<PlanningError> for KotError {
    fn from(err: PlanningError) -> Self {
        KotError::Planning(
            ErrorInfo::new(err.code(), err.to_string())
                .with_context("check", err.check().to_string())
                .with_hint("fix the check wiring and rerun"),
        )
    }
}
