//! Explicit registration context for facts, fixtures and checks.
//!
//! Every provider declares the names it needs up front; the engine binds by
//! that list. Facts and fixtures share one namespace.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use kot_core::{ErrorInfo, KotError, Outcome, ProviderError, Value};

use crate::inputs::{Injected, Inputs};
use crate::selector::Selector;

type FactFn = Box<dyn Fn(&Inputs) -> Result<Value, ProviderError>>;
type AcquireFn = Box<dyn Fn(&Inputs) -> Result<Acquired, ProviderError>>;
type CheckFn = Box<dyn Fn(&Inputs) -> Result<Outcome, ProviderError>>;
pub(crate) type ReleaseFn = Box<dyn FnOnce() -> Result<(), ProviderError>>;

fn collect_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Memoized value provider.
pub struct Fact {
    name: String,
    needs: Vec<String>,
    provider: FactFn,
}

impl Fact {
    /// Fact `name` computed by `provider`.
    pub fn new<F>(name: impl Into<String>, provider: F) -> Self
    where
        F: Fn(&Inputs) -> Result<Value, ProviderError> + 'static,
    {
        Self {
            name: name.into(),
            needs: Vec::new(),
            provider: Box::new(provider),
        }
    }

    /// Names of the facts and parameters this fact needs.
    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = collect_names(needs);
        self
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared needs in order.
    pub fn needs(&self) -> &[String] {
        &self.needs
    }

    pub(crate) fn invoke(&self, inputs: &Inputs) -> Result<Value, ProviderError> {
        (self.provider)(inputs)
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fact")
            .field("name", &self.name)
            .field("needs", &self.needs)
            .finish_non_exhaustive()
    }
}

/// Value produced by a fixture's acquire step together with its release step.
pub struct Acquired {
    pub(crate) value: Injected,
    pub(crate) release: Option<ReleaseFn>,
}

impl Acquired {
    /// A plain value; combine with [`Acquired::with_release`] for cleanup.
    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Injected::Value(value.into()),
            release: None,
        }
    }

    /// A shared resource that checks reach through [`Inputs::handle`].
    pub fn handle<T: Any>(handle: Rc<T>) -> Self {
        Self {
            value: Injected::Handle(handle),
            release: None,
        }
    }

    /// Registers the release step. It runs once after the consuming instance
    /// finishes, whatever its outcome.
    pub fn with_release<F>(mut self, release: F) -> Self
    where
        F: FnOnce() -> Result<(), ProviderError> + 'static,
    {
        self.release = Some(Box::new(release));
        self
    }
}

/// Per-instance resource provider.
pub struct Fixture {
    name: String,
    needs: Vec<String>,
    acquire: AcquireFn,
}

impl Fixture {
    /// Fixture `name` built by `acquire`.
    pub fn new<F>(name: impl Into<String>, acquire: F) -> Self
    where
        F: Fn(&Inputs) -> Result<Acquired, ProviderError> + 'static,
    {
        Self {
            name: name.into(),
            needs: Vec::new(),
            acquire: Box::new(acquire),
        }
    }

    /// Names of the facts, fixtures and parameters this fixture needs.
    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = collect_names(needs);
        self
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared needs in order.
    pub fn needs(&self) -> &[String] {
        &self.needs
    }

    pub(crate) fn acquire(&self, inputs: &Inputs) -> Result<Acquired, ProviderError> {
        (self.acquire)(inputs)
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("needs", &self.needs)
            .finish_non_exhaustive()
    }
}

/// Where a parametrized argument draws its candidate values from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSource {
    /// Fixed list of values.
    Values(Vec<Value>),
    /// Fact whose value is a JSON array.
    Fact(String),
}

/// One parametrize declaration on a check.
#[derive(Debug, Clone, PartialEq)]
pub struct Parametrize {
    /// Parameter name bound in each instance.
    pub name: String,
    /// Where candidate values come from.
    pub source: ParamSource,
    /// Skip the remaining instances after the first failure.
    pub fail_fast: bool,
}

impl Parametrize {
    /// Draws values from a fixed list.
    pub fn values<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            source: ParamSource::Values(values.into_iter().map(Into::into).collect()),
            fail_fast: false,
        }
    }

    /// Draws values from a fact expected to yield a JSON array.
    pub fn from_fact(name: impl Into<String>, fact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ParamSource::Fact(fact.into()),
            fail_fast: false,
        }
    }

    /// Sets whether the first failing instance skips the rest.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Named assertion producing an [`Outcome`].
pub struct Check {
    name: String,
    needs: Vec<String>,
    depends: Vec<String>,
    selector: Selector,
    tags: Vec<String>,
    params: Vec<Parametrize>,
    func: CheckFn,
}

impl Check {
    /// Check `name` running `func`.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Inputs) -> Result<Outcome, ProviderError> + 'static,
    {
        Self {
            name: name.into(),
            needs: Vec::new(),
            depends: Vec::new(),
            selector: Selector::Always,
            tags: Vec::new(),
            params: Vec::new(),
            func: Box::new(func),
        }
    }

    /// Names injected into the check: facts, fixtures or parameter names.
    pub fn with_needs<I, S>(mut self, needs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs = collect_names(needs);
        self
    }

    /// Facts or fixtures prepared before the check runs without being injected.
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = collect_names(depends);
        self
    }

    /// Gates the check on `selector`.
    pub fn with_selector(mut self, selector: impl Into<Selector>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Tags used by the run filter and reports.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = collect_names(tags);
        self
    }

    /// Appends a parametrize declaration. The first declared parameter varies
    /// slowest in the expanded plan.
    pub fn with_parametrize(mut self, param: Parametrize) -> Self {
        self.params.push(param);
        self
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names injected into the check function.
    pub fn needs(&self) -> &[String] {
        &self.needs
    }

    /// Names resolved before the check runs but not injected.
    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    /// Selector gating the check.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Tags in declaration order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Parametrize declarations in order.
    pub fn params(&self) -> &[Parametrize] {
        &self.params
    }

    /// Whether any parametrize declaration enables fail-fast.
    pub fn fail_fast(&self) -> bool {
        self.params.iter().any(|param| param.fail_fast)
    }

    pub(crate) fn invoke(&self, inputs: &Inputs) -> Result<Outcome, ProviderError> {
        (self.func)(inputs)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("needs", &self.needs)
            .field("depends", &self.depends)
            .field("selector", &self.selector)
            .field("tags", &self.tags)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What a name resolves to in the shared fact/fixture namespace.
#[derive(Debug, Clone, Copy)]
pub enum Provider<'r> {
    Fact(&'r Fact),
    Fixture(&'r Fixture),
    /// Neither a fact nor a fixture.
    Missing,
}

#[derive(Debug)]
struct Entry<T> {
    provider: T,
    origin: Option<String>,
}

/// Name to provider mappings, built once and passed by reference into runs.
#[derive(Debug, Default)]
pub struct Registry {
    facts: IndexMap<String, Entry<Fact>>,
    fixtures: IndexMap<String, Entry<Fixture>>,
    checks: IndexMap<String, Entry<Check>>,
    origin: Option<String>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin recorded for subsequent registrations (usually a
    /// plugin name). Returns the previous origin.
    pub fn set_origin(&mut self, origin: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.origin, origin)
    }

    /// Origin attached to providers registered from now on.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Registers a fact. Fails when the name is already a fact or a fixture.
    pub fn add_fact(&mut self, fact: Fact) -> Result<(), KotError> {
        self.ensure_free("fact", &fact.name)?;
        let entry = Entry {
            origin: self.origin.clone(),
            provider: fact,
        };
        self.facts.insert(entry.provider.name.clone(), entry);
        Ok(())
    }

    /// Registers a fixture. Fails when the name is already a fact or a fixture.
    pub fn add_fixture(&mut self, fixture: Fixture) -> Result<(), KotError> {
        self.ensure_free("fixture", &fixture.name)?;
        let entry = Entry {
            origin: self.origin.clone(),
            provider: fixture,
        };
        self.fixtures.insert(entry.provider.name.clone(), entry);
        Ok(())
    }

    /// Registers a check. Fails on a duplicate check name.
    pub fn add_check(&mut self, check: Check) -> Result<(), KotError> {
        if let Some(existing) = self.checks.get(&check.name) {
            return Err(self.duplicate("check", &check.name, existing.origin.as_deref()));
        }
        let entry = Entry {
            origin: self.origin.clone(),
            provider: check,
        };
        self.checks.insert(entry.provider.name.clone(), entry);
        Ok(())
    }

    fn ensure_free(&self, kind: &str, name: &str) -> Result<(), KotError> {
        if let Some(existing) = self.facts.get(name) {
            return Err(self.duplicate(kind, name, existing.origin.as_deref()));
        }
        if let Some(existing) = self.fixtures.get(name) {
            return Err(self.duplicate(kind, name, existing.origin.as_deref()));
        }
        Ok(())
    }

    fn duplicate(&self, kind: &str, name: &str, first: Option<&str>) -> KotError {
        let mut message = format!("Duplicate {kind} id '{name}'");
        let mut info = ErrorInfo::new(format!("registry.duplicate_{kind}"), String::new())
            .with_context("id", name);
        if let Some(first) = first {
            message.push_str(&format!(" (first registered by '{first}')"));
            info = info.with_context("first_origin", first);
        }
        if let Some(current) = self.origin.as_deref() {
            message.push_str(&format!(" while loading '{current}'"));
            info = info.with_context("origin", current);
        }
        info.message = message;
        KotError::Registry(info)
    }

    /// Fact registered as `name`.
    pub fn fact(&self, name: &str) -> Option<&Fact> {
        self.facts.get(name).map(|entry| &entry.provider)
    }

    /// Fixture registered as `name`.
    pub fn fixture(&self, name: &str) -> Option<&Fixture> {
        self.fixtures.get(name).map(|entry| &entry.provider)
    }

    /// Check registered as `name`.
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.get(name).map(|entry| &entry.provider)
    }

    /// Facts in registration order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values().map(|entry| &entry.provider)
    }

    /// Fixtures in registration order.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.values().map(|entry| &entry.provider)
    }

    /// Checks in registration order.
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.checks.values().map(|entry| &entry.provider)
    }

    /// Origin recorded when `name` was registered, for any provider kind.
    pub fn origin_of(&self, name: &str) -> Option<&str> {
        self.facts
            .get(name)
            .and_then(|entry| entry.origin.as_deref())
            .or_else(|| self.fixtures.get(name).and_then(|e| e.origin.as_deref()))
            .or_else(|| self.checks.get(name).and_then(|e| e.origin.as_deref()))
    }

    /// Looks `name` up in the shared fact/fixture namespace.
    pub fn lookup(&self, name: &str) -> Provider<'_> {
        if let Some(fact) = self.fact(name) {
            Provider::Fact(fact)
        } else if let Some(fixture) = self.fixture(name) {
            Provider::Fixture(fixture)
        } else {
            Provider::Missing
        }
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.fixtures.is_empty() && self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(name: &str) -> Fact {
        Fact::new(name, |_| Ok(Value::Bool(true)))
    }

    #[test]
    fn facts_and_fixtures_share_a_namespace() {
        let mut registry = Registry::new();
        registry.add_fact(constant("db")).unwrap();
        let err = registry
            .add_fixture(Fixture::new("db", |_| Ok(Acquired::value(1))))
            .unwrap_err();
        assert_eq!(err.code(), "registry.duplicate_fixture");
        assert!(matches!(registry.lookup("db"), Provider::Fact(_)));
        assert!(matches!(registry.lookup("nope"), Provider::Missing));
    }

    #[test]
    fn duplicate_checks_name_both_origins() {
        let mut registry = Registry::new();
        registry.set_origin(Some("pcol1".into()));
        registry
            .add_check(Check::new("same", |_| Ok(Outcome::pass("a"))))
            .unwrap();
        registry.set_origin(Some("pcol2".into()));
        let err = registry
            .add_check(Check::new("same", |_| Ok(Outcome::pass("b"))))
            .unwrap_err();
        let message = &err.info().message;
        assert!(message.contains("Duplicate check id 'same'"));
        assert!(message.contains("pcol1") && message.contains("pcol2"));
        assert_eq!(registry.origin_of("same"), Some("pcol1"));
    }

    #[test]
    fn checks_keep_registration_order() {
        let mut registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .add_check(Check::new(name, |_| Ok(Outcome::pass(""))))
                .unwrap();
        }
        let names: Vec<_> = registry.checks().map(Check::name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
