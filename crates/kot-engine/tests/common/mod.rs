#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use kot_engine::{Check, CheckResult, Fact, Outcome, Registry, RunResult, Runner, Status, Value};

/// Shared, ordered record of provider calls.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }
}

pub fn constant_fact(name: &str, value: Value) -> Fact {
    Fact::new(name, move |_| Ok(value.clone()))
}

pub fn counted_fact(name: &str, value: Value, log: &CallLog) -> Fact {
    let log = log.clone();
    let label = name.to_string();
    Fact::new(name, move |_| {
        log.push(label.clone());
        Ok(value.clone())
    })
}

pub fn returning(name: &str, status: Status, evidence: &str) -> Check {
    let evidence = evidence.to_string();
    Check::new(name, move |_| Ok(Outcome::new(status, evidence.clone())))
}

pub fn run(registry: &Registry) -> RunResult {
    Runner::new().run(registry).expect("run should not hit a planning error")
}

pub fn item<'a>(result: &'a RunResult, id: &str) -> &'a CheckResult {
    result
        .item(id)
        .unwrap_or_else(|| panic!("no item '{id}' in {:?}", ids(result)))
}

pub fn ids(result: &RunResult) -> Vec<String> {
    result.items.iter().map(|item| item.id.clone()).collect()
}

pub fn evidence_text(item: &CheckResult) -> String {
    match &item.evidence {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
