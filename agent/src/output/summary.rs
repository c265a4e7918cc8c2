//! Summary builder
//!
//! Builds minimal summary output with pass/fail counts.

use super::AGENT_ID;
use crate::config::ProbeRun;

/// Build the summary JSON for a run
pub fn build_summary(run: &ProbeRun) -> serde_json::Value {
    let report = &run.outcome.report;

    serde_json::json!({
        "agent": {
            "id": AGENT_ID,
            "name": AGENT_ID,
            "version": env!("CARGO_PKG_VERSION")
        },
        "summary": {
            "passed": run.outcome.passed(),
            "status": run.status().as_str(),
            "directories": report.directories.len(),
            "libraries_checked": report.libraries_checked(),
            "accessible": report.accessible.len(),
            "inaccessible": report.inaccessible,
            "skipped": report.skipped.len()
        },
        "reason": run.reason()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{run_with, violation};

    #[test]
    fn passing_run() {
        let summary = build_summary(&run_with(None));
        assert_eq!(summary["summary"]["passed"], true);
        assert_eq!(summary["summary"]["status"], "passed");
        assert_eq!(summary["summary"]["libraries_checked"], 5);
        assert_eq!(summary["summary"]["skipped"], 1);
        assert!(summary["reason"].is_null());
    }

    #[test]
    fn violating_run() {
        let summary = build_summary(&run_with(Some(violation())));
        assert_eq!(summary["summary"]["passed"], false);
        assert_eq!(summary["summary"]["status"], "violation");
        assert_eq!(
            summary["reason"],
            "The library \"/vendor/lib64/libc.so\" should not be accessible"
        );
    }
}
