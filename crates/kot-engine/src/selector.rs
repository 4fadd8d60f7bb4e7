//! Fact-only predicates gating whether a check runs.

use std::fmt;

use kot_core::value::is_truthy;
use kot_core::{ProviderError, Value};

use crate::error::{PlanningError, ResolveError};
use crate::inputs::{Injected, Inputs};
use crate::registry::{Provider, Registry};

type PredicateFn = Box<dyn Fn(&Inputs) -> Result<bool, ProviderError>>;

/// Selector attached to a check.
pub enum Selector {
    /// No selector; the check always runs.
    Always,
    /// A single fact that must be truthy.
    Fact(String),
    /// Shorthand: one fact name or a comma-separated list, all truthy.
    Facts(String),
    /// Arbitrary predicate over facts.
    Predicate { needs: Vec<String>, f: PredicateFn },
    /// Every child must hold; stops at the first false one.
    AllOf(Vec<Selector>),
    /// At least one child must hold; stops at the first true one.
    AnyOf(Vec<Selector>),
    Not(Box<Selector>),
}

impl Selector {
    /// Predicate over the facts named in `needs`.
    pub fn predicate<I, S, F>(needs: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Inputs) -> Result<bool, ProviderError> + 'static,
    {
        Selector::Predicate {
            needs: needs.into_iter().map(Into::into).collect(),
            f: Box::new(f),
        }
    }

    /// Whether this is the absent selector.
    pub fn is_always(&self) -> bool {
        matches!(self, Selector::Always)
    }

    /// Every fact name the selector references, in evaluation order.
    /// Rejects shorthand with an empty element.
    pub fn fact_names(&self, check: &str) -> Result<Vec<String>, PlanningError> {
        let mut names = Vec::new();
        self.collect_names(check, &mut names)?;
        Ok(names)
    }

    fn collect_names(&self, check: &str, out: &mut Vec<String>) -> Result<(), PlanningError> {
        match self {
            Selector::Always => {}
            Selector::Fact(name) => out.push(name.clone()),
            Selector::Facts(spec) => out.extend(split_shorthand(check, spec)?),
            Selector::Predicate { needs, .. } => out.extend(needs.iter().cloned()),
            Selector::AllOf(parts) | Selector::AnyOf(parts) => {
                for part in parts {
                    part.collect_names(check, out)?;
                }
            }
            Selector::Not(inner) => inner.collect_names(check, out)?,
        }
        Ok(())
    }

    /// Validates names against the registry: every name must be a fact.
    pub fn validate(&self, check: &str, registry: &Registry) -> Result<(), PlanningError> {
        for name in self.fact_names(check)? {
            match registry.lookup(&name) {
                Provider::Fact(_) => {}
                Provider::Fixture(_) => {
                    return Err(PlanningError::FixtureInSelector {
                        check: check.to_string(),
                        name,
                    })
                }
                Provider::Missing => {
                    return Err(PlanningError::UnknownName {
                        check: check.to_string(),
                        role: "selector fact",
                        name,
                        expected: "fact",
                    })
                }
            }
        }
        Ok(())
    }

    /// Evaluates the selector, short-circuiting combinators. `resolve` yields
    /// fact values through the run resolver.
    pub fn evaluate<R>(&self, resolve: &mut R) -> Result<bool, ProviderError>
    where
        R: FnMut(&str) -> Result<Value, ResolveError>,
    {
        match self {
            Selector::Always => Ok(true),
            Selector::Fact(name) => truthy_fact(name, resolve),
            Selector::Facts(spec) => {
                for name in spec.split(',').map(str::trim) {
                    if !truthy_fact(name, resolve)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Selector::Predicate { needs, f } => {
                let mut inputs = Inputs::new();
                for need in needs {
                    let value = resolve(need.as_str()).map_err(ResolveError::into_provider_error)?;
                    inputs.insert(need.clone(), Injected::Value(value));
                }
                f(&inputs)
            }
            Selector::AllOf(parts) => {
                for part in parts {
                    if !part.evaluate(resolve)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Selector::AnyOf(parts) => {
                for part in parts {
                    if part.evaluate(resolve)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Selector::Not(inner) => Ok(!inner.evaluate(resolve)?),
        }
    }
}

fn truthy_fact<R>(name: &str, resolve: &mut R) -> Result<bool, ProviderError>
where
    R: FnMut(&str) -> Result<Value, ResolveError>,
{
    resolve(name)
        .map(|value| is_truthy(&value))
        .map_err(ResolveError::into_provider_error)
}

fn split_shorthand(check: &str, spec: &str) -> Result<Vec<String>, PlanningError> {
    spec.split(',')
        .map(str::trim)
        .map(|name| {
            if name.is_empty() {
                Err(PlanningError::MalformedSelector {
                    check: check.to_string(),
                    spec: spec.to_string(),
                })
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

/// All named facts must be truthy.
pub fn all_of<I, S>(names: I) -> Selector
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Selector::AllOf(names.into_iter().map(|n| Selector::Fact(n.into())).collect())
}

/// At least one named fact must be truthy.
pub fn any_of<I, S>(names: I) -> Selector
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Selector::AnyOf(names.into_iter().map(|n| Selector::Fact(n.into())).collect())
}

/// Negates `selector`.
pub fn not(selector: impl Into<Selector>) -> Selector {
    Selector::Not(Box::new(selector.into()))
}

impl From<&str> for Selector {
    fn from(spec: &str) -> Self {
        Selector::Facts(spec.to_string())
    }
}

impl From<String> for Selector {
    fn from(spec: String) -> Self {
        Selector::Facts(spec)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Always => f.write_str("Always"),
            Selector::Fact(name) => f.debug_tuple("Fact").field(name).finish(),
            Selector::Facts(spec) => f.debug_tuple("Facts").field(spec).finish(),
            Selector::Predicate { needs, .. } => f
                .debug_struct("Predicate")
                .field("needs", needs)
                .finish_non_exhaustive(),
            Selector::AllOf(parts) => f.debug_tuple("AllOf").field(parts).finish(),
            Selector::AnyOf(parts) => f.debug_tuple("AnyOf").field(parts).finish(),
            Selector::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}
