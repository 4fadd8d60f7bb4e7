use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use kot_core::Value;
use tracing::debug;

use crate::error::ResolveError;
use crate::inputs::{Injected, Inputs};
use crate::registry::{Fact, Registry};

/// Parameter bindings of one check instance, in declaration order.
pub type Bindings = IndexMap<String, Value>;

/// Facts seen by one check instance: its bindings plus the values of facts
/// that depend on them.
#[derive(Debug, Clone, Default)]
pub struct InstanceFacts {
    bindings: Bindings,
    local: BTreeMap<String, Value>,
}

impl InstanceFacts {
    /// Facts of an instance with `bindings`.
    pub fn new(bindings: Bindings) -> Self {
        Self {
            bindings,
            local: BTreeMap::new(),
        }
    }

    /// All bindings in declaration order.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Value bound to `name`, if any.
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// Per-run fact resolver with memoization and cycle detection.
///
/// Facts are computed lazily and at most once per run. A fact that reaches
/// an instance binding is evaluated per instance and cached only in that
/// instance's [`InstanceFacts`].
pub struct Resolver<'r> {
    registry: &'r Registry,
    cache: BTreeMap<String, Value>,
    invocations: BTreeMap<String, usize>,
}

impl<'r> Resolver<'r> {
    /// Resolver with an empty cache.
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            cache: BTreeMap::new(),
            invocations: BTreeMap::new(),
        }
    }

    /// Registry this resolver reads.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolves a run-scoped fact.
    pub fn resolve(&mut self, name: &str) -> Result<Value, ResolveError> {
        let mut facts = InstanceFacts::default();
        self.resolve_in(name, &mut facts)
    }

    /// Resolves a fact with access to the bindings of the current instance.
    pub fn resolve_in(
        &mut self,
        name: &str,
        facts: &mut InstanceFacts,
    ) -> Result<Value, ResolveError> {
        let mut stack = Vec::new();
        self.resolve_fact(name, &mut stack, facts)
            .map(|(value, _)| value)
    }

    /// Number of times the provider of `name` ran during this run.
    pub fn invocations(&self, name: &str) -> usize {
        self.invocations.get(name).copied().unwrap_or(0)
    }

    /// Whether `name` holds a run-scoped cached value.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Returns whether `name` is a fact that needs, directly or through other
    /// facts, one of `targets`.
    pub fn reaches_any(&self, name: &str, targets: &BTreeSet<&str>) -> bool {
        let mut seen = BTreeSet::new();
        self.reaches(name, targets, &mut seen)
    }

    fn reaches<'a>(
        &'a self,
        name: &'a str,
        targets: &BTreeSet<&str>,
        seen: &mut BTreeSet<&'a str>,
    ) -> bool {
        if !seen.insert(name) {
            return false;
        }
        let Some(fact) = self.registry.fact(name) else {
            return false;
        };
        fact.needs().iter().any(|need| {
            targets.contains(need.as_str()) || self.reaches(need, targets, seen)
        })
    }

    fn reaches_binding(&self, name: &str, facts: &InstanceFacts) -> bool {
        if facts.bindings.is_empty() {
            return false;
        }
        let targets: BTreeSet<&str> = facts.bindings.keys().map(String::as_str).collect();
        self.reaches_any(name, &targets)
    }

    fn resolve_fact(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
        facts: &mut InstanceFacts,
    ) -> Result<(Value, bool), ResolveError> {
        if let Some(value) = facts.local.get(name) {
            return Ok((value.clone(), true));
        }
        // A run-scoped value of a fact that reaches a binding was computed
        // without it and must not shadow the per-instance value.
        if !self.reaches_binding(name, facts) {
            if let Some(value) = self.cache.get(name) {
                return Ok((value.clone(), false));
            }
        }
        if stack.iter().any(|entry| entry == name) {
            let mut path = stack.clone();
            path.push(name.to_string());
            return Err(ResolveError::FactCycle { path });
        }
        let registry = self.registry;
        let Some(fact) = registry.fact(name) else {
            return Err(if registry.fixture(name).is_some() {
                ResolveError::FixtureNotAllowed {
                    name: name.to_string(),
                }
            } else {
                ResolveError::NotFound {
                    name: name.to_string(),
                }
            });
        };

        stack.push(name.to_string());
        let gathered = self.gather(fact, stack, facts);
        stack.pop();
        let (inputs, bound) = gathered?;

        *self.invocations.entry(name.to_string()).or_default() += 1;
        let value = fact
            .invoke(&inputs)
            .map_err(|error| ResolveError::Provider {
                name: name.to_string(),
                error,
            })?;
        debug!(fact = name, instance_bound = bound, "fact resolved");
        if bound {
            facts.local.insert(name.to_string(), value.clone());
        } else {
            self.cache.insert(name.to_string(), value.clone());
        }
        Ok((value, bound))
    }

    fn gather(
        &mut self,
        fact: &Fact,
        stack: &mut Vec<String>,
        facts: &mut InstanceFacts,
    ) -> Result<(Inputs, bool), ResolveError> {
        let mut inputs = Inputs::new();
        let mut bound = false;
        for need in fact.needs() {
            if let Some(value) = facts.binding(need) {
                inputs.insert(need.clone(), Injected::Value(value.clone()));
                bound = true;
                continue;
            }
            let (value, need_bound) = self.resolve_fact(need, stack, facts)?;
            bound |= need_bound;
            inputs.insert(need.clone(), Injected::Value(value));
        }
        Ok((inputs, bound))
    }
}
