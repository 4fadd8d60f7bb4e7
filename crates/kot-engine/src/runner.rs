//! Drives selector evaluation, planning and per-instance execution.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use kot_core::{Outcome, ProviderError, Status, Value};
use tracing::{debug, error, info, info_span, warn};

use crate::error::{PlanningError, ResolveError};
use crate::fixtures::FixtureScope;
use crate::planner::plan_check;
use crate::registry::{Check, ParamSource, Provider, Registry};
use crate::report::{CheckResult, RunResult, ENGINE_ITEM_ID, FAIL_FAST_SKIP, SELECTOR_FALSE};
use crate::resolver::{InstanceFacts, Resolver};

/// Options applied to a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// When set, only checks carrying at least one of these tags run.
    pub allowed_tags: Option<BTreeSet<String>>,
}

impl RunOptions {
    /// Restricts the run to checks carrying one of `tags`.
    pub fn with_allowed_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Sequential execution engine. Every call to [`Runner::run`] starts with a
/// fresh fact cache.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    options: RunOptions,
}

impl Runner {
    /// Runner without a tag filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner applying `options`.
    pub fn with_options(options: RunOptions) -> Self {
        Self { options }
    }

    /// Options applied to each run.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Whether `check` passes the tag filter.
    pub fn includes(&self, check: &Check) -> bool {
        match &self.options.allowed_tags {
            None => true,
            Some(allowed) => check.tags().iter().any(|tag| allowed.contains(tag)),
        }
    }

    /// Runs every included check of `registry`.
    ///
    /// Wiring defects are reported as [`PlanningError`] before or during the
    /// run and no report is produced. Everything a check instance raises is
    /// recorded as an ERROR item instead.
    pub fn run(&self, registry: &Registry) -> Result<RunResult, PlanningError> {
        let checks: Vec<&Check> = registry
            .checks()
            .filter(|check| {
                let included = self.includes(check);
                if !included {
                    debug!(check = check.name(), "check excluded by tag filter");
                }
                included
            })
            .collect();
        info!(checks = checks.len(), "run started");

        for check in &checks {
            preflight(check, registry)?;
        }

        let mut items = Vec::new();
        let mut resolver = Resolver::new(registry);
        let executed = catch_unwind(AssertUnwindSafe(|| -> Result<(), PlanningError> {
            for check in &checks {
                execute_check(check, &mut resolver, &mut items)?;
            }
            Ok(())
        }));
        match executed {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(check = err.check(), error = %err, "planning error aborted the run");
                return Err(err);
            }
            Err(payload) => {
                let err = ProviderError::from_panic(payload.as_ref());
                error!(error = %err, "run loop panicked");
                items.push(CheckResult::new(
                    ENGINE_ITEM_ID,
                    Status::Error,
                    format!("exception: {err}"),
                    &[],
                ));
            }
        }

        let result = RunResult::from_items(items);
        info!(
            overall = %result.overall,
            pass = result.counts.pass,
            warn = result.counts.warn,
            fail = result.counts.fail,
            skip = result.counts.skip,
            error = result.counts.error,
            "run finished"
        );
        Ok(result)
    }
}

/// Validates selector names, parametrize sources and depends names before
/// anything executes.
fn preflight(check: &Check, registry: &Registry) -> Result<(), PlanningError> {
    check.selector().validate(check.name(), registry)?;
    for param in check.params() {
        if let ParamSource::Fact(fact) = &param.source {
            if registry.fact(fact).is_none() {
                return Err(PlanningError::UnknownName {
                    check: check.name().to_string(),
                    role: "parametrize source",
                    name: fact.clone(),
                    expected: "fact",
                });
            }
        }
    }
    for name in check.depends() {
        if let Provider::Missing = registry.lookup(name) {
            return Err(PlanningError::UnknownName {
                check: check.name().to_string(),
                role: "depends",
                name: name.clone(),
                expected: "fact or fixture",
            });
        }
    }
    Ok(())
}

/// Evaluates the selector of `check`. Errors and panics both abort the run.
fn evaluate_selector<R>(check: &Check, resolve: &mut R) -> Result<bool, PlanningError>
where
    R: FnMut(&str) -> Result<Value, ResolveError>,
{
    catch_unwind(AssertUnwindSafe(|| check.selector().evaluate(resolve)))
        .unwrap_or_else(|payload| Err(ProviderError::from_panic(payload.as_ref())))
        .map_err(|err| PlanningError::SelectorFailed {
            check: check.name().to_string(),
            cause: err.to_string(),
        })
}

fn execute_check(
    check: &Check,
    resolver: &mut Resolver<'_>,
    items: &mut Vec<CheckResult>,
) -> Result<(), PlanningError> {
    let span = info_span!("check", check = check.name());
    let _entered = span.enter();

    let params: BTreeSet<&str> = check.params().iter().map(|p| p.name.as_str()).collect();
    let per_instance = !params.is_empty()
        && check
            .selector()
            .fact_names(check.name())?
            .iter()
            .any(|name| resolver.reaches_any(name, &params));

    if !per_instance {
        let selected = evaluate_selector(check, &mut |name: &str| resolver.resolve(name))?;
        if !selected {
            debug!("selector evaluated to false");
            items.push(CheckResult::new(check.name(), Status::Skip, SELECTOR_FALSE, check.tags()));
            return Ok(());
        }
    }

    let planned = catch_unwind(AssertUnwindSafe(|| plan_check(check, resolver)))
        .unwrap_or_else(|payload| Err(ProviderError::from_panic(payload.as_ref())));
    let plan = match planned {
        Ok(plan) => plan,
        Err(err) => {
            warn!(error = %err, "parametrization failed");
            items.push(CheckResult::new(
                check.name(),
                Status::Error,
                format!("exception: {err}"),
                check.tags(),
            ));
            return Ok(());
        }
    };
    debug!(instances = plan.len(), per_instance_selector = per_instance, "instances planned");

    let fail_fast = check.fail_fast();
    let mut tripped = false;
    for instance in plan {
        if tripped {
            items.push(CheckResult::new(instance.id, Status::Skip, FAIL_FAST_SKIP, check.tags()));
            continue;
        }
        let mut facts = InstanceFacts::new(instance.bindings);
        if per_instance {
            let selected =
                evaluate_selector(check, &mut |name: &str| resolver.resolve_in(name, &mut facts))?;
            if !selected {
                debug!(instance = %instance.id, "selector evaluated to false");
                items.push(CheckResult::new(instance.id, Status::Skip, SELECTOR_FALSE, check.tags()));
                continue;
            }
        }

        let result = execute_instance(check, instance.id, resolver, &mut facts);
        if fail_fast && result.status.is_failure() {
            tripped = true;
            info!(instance = %result.id, status = %result.status, "fail-fast triggered");
        }
        items.push(result);
    }
    Ok(())
}

fn execute_instance(
    check: &Check,
    id: String,
    resolver: &mut Resolver<'_>,
    facts: &mut InstanceFacts,
) -> CheckResult {
    let mut scope = FixtureScope::new();
    let invoked = catch_unwind(AssertUnwindSafe(|| -> Result<Outcome, String> {
        if !check.depends().is_empty() {
            info!(check = check.name(), names = ?check.depends(), "resolving depends");
            for name in check.depends() {
                let kind = match resolver.registry().lookup(name) {
                    Provider::Fixture(_) => "fixture",
                    _ => "fact",
                };
                if let Err(err) = scope.inject(name, resolver, facts) {
                    return Err(format!("depends failed: {name}: {}", err.into_provider_error()));
                }
                debug!(check = check.name(), name = %name, kind, "depends resolved");
            }
        }
        let inputs = scope
            .inputs_for(check.needs(), resolver, facts)
            .map_err(|err| err.evidence())?;
        check.invoke(&inputs).map_err(|err| format!("exception: {err}"))
    }));
    scope.close();

    let (status, evidence) = match invoked {
        Ok(Ok(outcome)) => (outcome.status, outcome.evidence),
        Ok(Err(evidence)) => (Status::Error, Value::String(evidence)),
        Err(payload) => {
            let err = ProviderError::from_panic(payload.as_ref());
            (Status::Error, Value::String(format!("exception: {err}")))
        }
    };
    debug!(instance = %id, status = %status, "instance finished");
    CheckResult::new(id, status, evidence, check.tags())
}
