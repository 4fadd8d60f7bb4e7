use std::panic::{catch_unwind, AssertUnwindSafe};

use indexmap::IndexMap;
use kot_core::ProviderError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::inputs::{Injected, Inputs};
use crate::registry::{Fixture, Provider, ReleaseFn};
use crate::resolver::{InstanceFacts, Resolver};

/// A fixture that could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency failed: fixture '{fixture}': {error}")]
pub struct FixtureError {
    /// Name of the fixture that failed.
    pub fixture: String,
    /// Failure reported by its acquire function.
    pub error: ProviderError,
}

/// Failure to produce one named input for a check instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

impl InjectError {
    /// Evidence recorded on the failing instance.
    pub fn evidence(&self) -> String {
        match self {
            InjectError::Resolve(err) => format!("exception: {}: {}", err.kind(), err.message()),
            InjectError::Fixture(err) => err.to_string(),
        }
    }

    /// Underlying provider failure, without the fixture wrapper.
    pub fn into_provider_error(self) -> ProviderError {
        match self {
            InjectError::Resolve(err) => err.into_provider_error(),
            InjectError::Fixture(err) => err.error,
        }
    }
}

/// Fixtures built for one check instance.
///
/// Each fixture is built at most once per scope. Release steps run in
/// reverse build order when the scope closes or is dropped, exactly once each.
#[derive(Default)]
pub struct FixtureScope {
    built: IndexMap<String, Injected>,
    releases: Vec<(String, ReleaseFn)>,
    building: Vec<String>,
}

impl FixtureScope {
    /// Empty scope with nothing acquired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the fixtures built so far, in build order.
    pub fn built(&self) -> impl Iterator<Item = &str> {
        self.built.keys().map(String::as_str)
    }

    /// Produces the input for `name`: an instance binding, a fixture built in
    /// this scope, or a fact from the resolver, in that order.
    pub fn inject(
        &mut self,
        name: &str,
        resolver: &mut Resolver<'_>,
        facts: &mut InstanceFacts,
    ) -> Result<Injected, InjectError> {
        if let Some(value) = facts.binding(name) {
            return Ok(Injected::Value(value.clone()));
        }
        match resolver.registry().lookup(name) {
            Provider::Fixture(fixture) => Ok(self.build(fixture, resolver, facts)?),
            Provider::Fact(_) | Provider::Missing => {
                Ok(Injected::Value(resolver.resolve_in(name, facts)?))
            }
        }
    }

    /// Collects every named input into [`Inputs`], stopping at the first failure.
    pub fn inputs_for(
        &mut self,
        names: &[String],
        resolver: &mut Resolver<'_>,
        facts: &mut InstanceFacts,
    ) -> Result<Inputs, InjectError> {
        let mut inputs = Inputs::new();
        for name in names {
            let injected = self.inject(name, resolver, facts)?;
            inputs.insert(name.clone(), injected);
        }
        Ok(inputs)
    }

    fn build(
        &mut self,
        fixture: &Fixture,
        resolver: &mut Resolver<'_>,
        facts: &mut InstanceFacts,
    ) -> Result<Injected, FixtureError> {
        let name = fixture.name();
        if let Some(existing) = self.built.get(name) {
            return Ok(existing.clone());
        }
        if self.building.iter().any(|entry| entry == name) {
            let mut path = self.building.clone();
            path.push(name.to_string());
            return Err(FixtureError {
                fixture: name.to_string(),
                error: ResolveError::FixtureCycle { path }.into_provider_error(),
            });
        }

        self.building.push(name.to_string());
        let gathered = self.inputs_for(fixture.needs(), resolver, facts);
        self.building.pop();
        let inputs = gathered.map_err(|err| match err {
            InjectError::Fixture(inner) => inner,
            InjectError::Resolve(err) => FixtureError {
                fixture: name.to_string(),
                error: err.into_provider_error(),
            },
        })?;

        let acquired = fixture.acquire(&inputs).map_err(|error| FixtureError {
            fixture: name.to_string(),
            error,
        })?;
        debug!(fixture = name, has_release = acquired.release.is_some(), "fixture built");
        if let Some(release) = acquired.release {
            self.releases.push((name.to_string(), release));
        }
        self.built.insert(name.to_string(), acquired.value.clone());
        Ok(acquired.value)
    }

    /// Runs pending release steps in reverse build order. Release failures
    /// and panics are logged and swallowed so later releases still run.
    pub fn close(&mut self) {
        while let Some((name, release)) = self.releases.pop() {
            match catch_unwind(AssertUnwindSafe(release)) {
                Ok(Ok(())) => debug!(fixture = %name, "fixture released"),
                Ok(Err(err)) => warn!(fixture = %name, error = %err, "fixture release failed"),
                Err(payload) => {
                    let err = ProviderError::from_panic(payload.as_ref());
                    warn!(fixture = %name, error = %err, "fixture release panicked");
                }
            }
        }
        self.built.clear();
        self.building.clear();
    }
}

impl Drop for FixtureScope {
    fn drop(&mut self) {
        self.close();
    }
}
