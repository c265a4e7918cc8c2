//! Full result builder
//!
//! Builds complete results: the policy that was enforced, what the traversal
//! saw, and the failure that stopped it.

use std::path::Path;

use chrono::{DateTime, Utc};
use probe_kit::scanner::{ScanFailure, ScanReport};
use probe_kit::{ScanPolicy, Violation};
use serde::Serialize;
use uuid::Uuid;

use super::AGENT_ID;
use crate::config::ProbeRun;

#[derive(Debug, Serialize)]
pub struct FullResult<'a> {
    pub agent: AgentInfo,
    pub envelope: Envelope,
    pub passed: bool,
    pub status: &'static str,
    pub policy: &'a ScanPolicy,
    pub report: &'a ScanReport,
    pub failure: Option<FailureDetail<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AgentInfo {
    pub id: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub duration_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct FailureDetail<'a> {
    /// Harness-facing failure text
    pub reason: String,
    /// Directory or library the failure was observed on
    pub path: &'a Path,
    /// Structured violation, absent for I/O failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<&'a Violation>,
}

/// Build the full result for a run
pub fn build_full_result(run: &ProbeRun) -> FullResult<'_> {
    FullResult {
        agent: AgentInfo {
            id: AGENT_ID,
            version: env!("CARGO_PKG_VERSION"),
        },
        envelope: Envelope {
            run_id: run.run_id,
            started_at: run.started_at,
            generated_at: Utc::now(),
            duration_secs: run.duration.as_secs_f64(),
        },
        passed: run.outcome.passed(),
        status: run.status().as_str(),
        policy: &run.policy,
        report: &run.outcome.report,
        failure: run.outcome.failure.as_ref().map(failure_detail),
    }
}

fn failure_detail(failure: &ScanFailure) -> FailureDetail<'_> {
    match failure {
        ScanFailure::ReadDir { dir, .. } => FailureDetail {
            reason: failure.reason(),
            path: dir,
            violation: None,
        },
        ScanFailure::Violation(violation) => FailureDetail {
            reason: failure.reason(),
            path: violation.path(),
            violation: Some(violation),
        },
    }
}
