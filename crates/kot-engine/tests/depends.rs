mod common;

use common::{counted_fact, evidence_text, item, returning, run, CallLog};
use kot_engine::{Acquired, Fact, Fixture, PlanningError, ProviderError, Registry, Runner, Status};
use serde_json::json;

#[test]
fn depends_are_prepared_before_the_check() {
    let log = CallLog::new();
    let mut registry = Registry::new();
    registry.add_fact(counted_fact("cfg", json!({"v": 1}), &log)).unwrap();
    registry
        .add_check(returning("c", Status::Pass, "ok").with_depends(["cfg"]))
        .unwrap();

    let result = run(&registry);
    assert_eq!(item(&result, "c").status, Status::Pass);
    assert_eq!(log.entries(), vec!["cfg"]);
}

#[test]
fn unknown_depends_are_planning_errors() {
    let mut registry = Registry::new();
    registry
        .add_check(returning("c", Status::Pass, "ok").with_depends(["no_such"]))
        .unwrap();

    let err = Runner::new().run(&registry).unwrap_err();
    assert!(matches!(err, PlanningError::UnknownName { role: "depends", .. }));
}

#[test]
fn failing_fact_dependencies_error_the_instance() {
    let mut registry = Registry::new();
    registry
        .add_fact(Fact::new("bad", |_| Err(ProviderError::new("RuntimeError", "boom"))))
        .unwrap();
    registry
        .add_check(returning("c", Status::Pass, "never").with_depends(["bad"]))
        .unwrap();

    let result = run(&registry);
    let c = item(&result, "c");
    assert_eq!(c.status, Status::Error);
    assert_eq!(evidence_text(c), "depends failed: bad: RuntimeError: boom");
}

#[test]
fn failing_fixture_dependencies_release_earlier_fixtures() {
    let log = CallLog::new();
    let mut registry = Registry::new();
    let ok_log = log.clone();
    registry
        .add_fixture(Fixture::new("ok", move |_| {
            ok_log.push("ok:build");
            let release_log = ok_log.clone();
            Ok(Acquired::value(1).with_release(move || {
                release_log.push("ok:release");
                Ok(())
            }))
        }))
        .unwrap();
    registry
        .add_fixture(Fixture::new("bad", |_| Err(ProviderError::new("OSError", "no device"))))
        .unwrap();
    registry
        .add_check(returning("c", Status::Pass, "never").with_depends(["ok", "bad"]))
        .unwrap();

    let result = run(&registry);
    let c = item(&result, "c");
    assert_eq!(c.status, Status::Error);
    assert!(evidence_text(c).contains("depends failed"));
    assert_eq!(evidence_text(c), "depends failed: bad: OSError: no device");
    assert_eq!(log.entries(), vec!["ok:build", "ok:release"]);
}
