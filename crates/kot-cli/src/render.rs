use std::io::{self, Write};

use kot_core::value::render_evidence;
use kot_engine::{Registry, Report, Runner};

/// Single-line JSON report.
pub fn render_json(report: &Report, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)
}

/// One `STATUS  id: evidence` line per item followed by the overall status.
pub fn render_human(report: &Report, out: &mut impl Write) -> io::Result<()> {
    for item in &report.items {
        write!(out, "{:<6}{}: {}", item.status, item.id, render_evidence(&item.evidence))?;
        if let Some(tags) = &item.tags {
            if !tags.is_empty() {
                write!(out, " [{}]", tags.join(", "))?;
            }
        }
        writeln!(out)?;
    }
    let counts = &report.counts;
    writeln!(
        out,
        "OVERALL: {} (PASS={} FAIL={} WARN={} SKIP={} ERROR={})",
        report.overall, counts.pass, counts.fail, counts.warn, counts.skip, counts.error
    )
}

/// Every check that would run, with its tags, without running anything.
pub fn render_list(registry: &Registry, runner: &Runner, out: &mut impl Write) -> io::Result<()> {
    for check in registry.checks().filter(|check| runner.includes(check)) {
        writeln!(out, "{} [{}]", check.name(), check.tags().join(", "))?;
    }
    Ok(())
}
