use kot_core::errors::{ErrorInfo, KotError};
use kot_core::serde::from_json_slice;
use kot_core::{Status, StatusCounts, Value};
use serde::{Deserialize, Serialize};

/// Evidence of a check whose selector evaluated to false.
pub const SELECTOR_FALSE: &str = "selector=false";
/// Evidence of an instance skipped after an earlier fail-fast failure.
pub const FAIL_FAST_SKIP: &str = "skipped due to fail_fast after previous failure";
/// Id of the synthetic item recorded when the run loop itself breaks.
pub const ENGINE_ITEM_ID: &str = "Runner::run";

/// Final result of one check instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check id, with parameter bindings for instances.
    pub id: String,
    /// Final status.
    pub status: Status,
    /// Evidence text or structured value.
    pub evidence: Value,
    /// Tags of the check.
    pub tags: Vec<String>,
}

impl CheckResult {
    /// Result for `id` carrying the check's `tags`.
    pub fn new(id: impl Into<String>, status: Status, evidence: impl Into<Value>, tags: &[String]) -> Self {
        Self {
            id: id.into(),
            status,
            evidence: evidence.into(),
            tags: tags.to_vec(),
        }
    }
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// PASS, WARN or FAIL.
    pub overall: Status,
    /// Per-status item counts.
    pub counts: StatusCounts,
    /// Items in execution order.
    pub items: Vec<CheckResult>,
}

impl RunResult {
    /// Tallies `items` and derives the overall status: FAIL when anything
    /// failed or errored, else WARN when anything warned, else PASS.
    pub fn from_items(items: Vec<CheckResult>) -> Self {
        let counts = StatusCounts::tally(items.iter().map(|item| item.status));
        let overall = overall_status(&counts);
        Self {
            overall,
            counts,
            items,
        }
    }

    /// FAIL and ERROR items in execution order, plus WARN when asked.
    pub fn problems(&self, include_warns: bool) -> Vec<&CheckResult> {
        self.items
            .iter()
            .filter(|item| item.status.is_failure() || (include_warns && item.status == Status::Warn))
            .collect()
    }

    /// Item with the given id.
    pub fn item(&self, id: &str) -> Option<&CheckResult> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Report shape consumed by renderers. Tags appear only when requested.
    pub fn to_report(&self, include_tags: bool) -> Report {
        Report {
            overall: self.overall,
            counts: self.counts,
            items: self
                .items
                .iter()
                .map(|item| ReportItem {
                    id: item.id.clone(),
                    status: item.status,
                    evidence: item.evidence.clone(),
                    tags: include_tags.then(|| item.tags.clone()),
                })
                .collect(),
        }
    }
}

/// Overall status for a set of counts. SKIP never changes it.
pub fn overall_status(counts: &StatusCounts) -> Status {
    if counts.error > 0 || counts.fail > 0 {
        Status::Fail
    } else if counts.warn > 0 {
        Status::Warn
    } else {
        Status::Pass
    }
}

/// One entry of a [`Report`]; `tags` is present only when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    /// Check or instance id.
    pub id: String,
    /// Final status.
    pub status: Status,
    /// Evidence as produced.
    pub evidence: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Machine-readable run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// PASS, WARN or FAIL.
    pub overall: Status,
    /// Per-status item counts.
    pub counts: StatusCounts,
    /// Items in execution order.
    pub items: Vec<ReportItem>,
}

impl Report {
    /// Single-line JSON in field order.
    pub fn to_json(&self) -> Result<String, KotError> {
        serde_json::to_string(self)
            .map_err(|err| KotError::Serde(ErrorInfo::new("serde.report_serialize", err.to_string())))
    }

    /// Reads a report previously written by [`Report::to_json`].
    pub fn from_json(data: &[u8]) -> Result<Self, KotError> {
        from_json_slice(data)
    }
}
