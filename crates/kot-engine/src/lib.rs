#![doc = "Planning and execution engine for kot: registry, resolver, fixtures, selectors, parametrization, runner and validators."]

pub mod error;
pub mod fixtures;
pub mod inputs;
pub mod planner;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod selector;
pub mod validators;

pub use error::{PlanningError, ResolveError};
pub use fixtures::{FixtureError, FixtureScope, InjectError};
pub use inputs::{Injected, Inputs};
pub use kot_core::{KotError, Outcome, ProviderError, Status, StatusCounts, Value};
pub use planner::{expand, instance_id, Axis, PlannedInstance};
pub use registry::{Acquired, Check, Fact, Fixture, ParamSource, Parametrize, Provider, Registry};
pub use report::{CheckResult, Report, ReportItem, RunResult};
pub use resolver::{Bindings, InstanceFacts, Resolver};
pub use runner::{RunOptions, Runner};
pub use selector::{all_of, any_of, not, Selector};
