use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, KotError};

/// Outcome class of a single check instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// The invariant holds.
    Pass,
    /// The invariant holds with a caveat worth surfacing.
    Warn,
    /// The invariant is violated.
    Fail,
    /// The check did not apply.
    Skip,
    /// The check could not be evaluated.
    Error,
}

impl Status {
    /// Every status in report order.
    pub const ALL: [Status; 5] = [
        Status::Pass,
        Status::Fail,
        Status::Warn,
        Status::Skip,
        Status::Error,
    ];

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::Skip => "SKIP",
            Status::Error => "ERROR",
        }
    }

    /// Aggregation severity. ERROR and FAIL tie; SKIP never outranks PASS.
    pub fn severity(self) -> u8 {
        match self {
            Status::Error | Status::Fail => 2,
            Status::Warn => 1,
            Status::Pass | Status::Skip => 0,
        }
    }

    /// Rank used when combining validator outcomes. Unlike [`Status::severity`],
    /// ERROR outranks FAIL.
    pub fn validator_rank(self) -> u8 {
        match self {
            Status::Error => 3,
            Status::Fail => 2,
            Status::Warn => 1,
            Status::Pass | Status::Skip => 0,
        }
    }

    /// Returns whether the status counts as a failure (FAIL or ERROR).
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Fail | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = KotError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "PASS" | "pass" => Ok(Status::Pass),
            "WARN" | "warn" => Ok(Status::Warn),
            "FAIL" | "fail" => Ok(Status::Fail),
            "SKIP" | "skip" => Ok(Status::Skip),
            "ERROR" | "error" => Ok(Status::Error),
            other => Err(KotError::Execution(
                ErrorInfo::new("status.unknown", format!("invalid status '{other}'"))
                    .with_hint("expected one of PASS, WARN, FAIL, SKIP, ERROR"),
            )),
        }
    }
}

/// Tally of results per status; all five keys are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Number of PASS results.
    #[serde(rename = "PASS")]
    pub pass: usize,
    /// Number of FAIL results.
    #[serde(rename = "FAIL")]
    pub fail: usize,
    /// Number of WARN results.
    #[serde(rename = "WARN")]
    pub warn: usize,
    /// Number of SKIP results.
    #[serde(rename = "SKIP")]
    pub skip: usize,
    /// Number of ERROR results.
    #[serde(rename = "ERROR")]
    pub error: usize,
}

impl StatusCounts {
    /// Counts the statuses yielded by the iterator.
    pub fn tally(statuses: impl IntoIterator<Item = Status>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            counts.record(status);
        }
        counts
    }

    /// Increments the counter for `status`.
    pub fn record(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    /// Returns the number of results with `status`.
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Pass => self.pass,
            Status::Warn => self.warn,
            Status::Fail => self.fail,
            Status::Skip => self.skip,
            Status::Error => self.error,
        }
    }

    /// Total number of recorded results.
    pub fn total(&self) -> usize {
        Status::ALL.iter().map(|status| self.get(*status)).sum()
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Pass => &mut self.pass,
            Status::Warn => &mut self.warn,
            Status::Fail => &mut self.fail,
            Status::Skip => &mut self.skip,
            Status::Error => &mut self.error,
        }
    }
}
