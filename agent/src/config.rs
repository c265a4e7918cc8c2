//! Configuration types for the probe agent
//!
//! Defines the run configuration and the record of a finished probe run.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use probe_kit::scanner::ScanOutcome;
use probe_kit::ScanPolicy;
use uuid::Uuid;

/// Output format for the JSON results file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pass/fail with counts only
    Summary,
    /// Policy, traversal report and failure details
    Full,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Summary => write!(f, "summary"),
            OutputFormat::Full => write!(f, "full"),
        }
    }
}

/// Configuration for a probe run
///
/// Only reporting is configurable; the library policy is fixed at build time.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Output file path (None means console-only output)
    pub output_file: Option<PathBuf>,

    /// Output format
    pub output_format: OutputFormat,

    /// Suppress console output
    pub quiet: bool,

    /// Vendor public library list
    pub vendor_config: PathBuf,
}

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    /// A library's load outcome contradicted the policy
    Violation,
    /// The scan could not be completed
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Violation => "violation",
            RunStatus::Error => "error",
        }
    }
}

/// Everything known about one finished probe run
#[derive(Debug)]
pub struct ProbeRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub policy: ScanPolicy,
    pub outcome: ScanOutcome,
}

impl ProbeRun {
    pub fn status(&self) -> RunStatus {
        match &self.outcome.failure {
            None => RunStatus::Passed,
            Some(failure) if failure.is_violation() => RunStatus::Violation,
            Some(_) => RunStatus::Error,
        }
    }

    /// Failure reason as the test harness would see it
    pub fn reason(&self) -> Option<String> {
        self.outcome.failure.as_ref().map(|f| f.reason())
    }

    /// Get the exit code based on results
    pub fn exit_code(&self) -> i32 {
        match self.status() {
            RunStatus::Passed => 0,
            RunStatus::Violation => 1,
            RunStatus::Error => 2,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use probe_kit::scanner::{ScanFailure, ScanReport};
    use probe_kit::Violation;

    pub(crate) fn run_with(failure: Option<ScanFailure>) -> ProbeRun {
        ProbeRun {
            run_id: Uuid::nil(),
            started_at: Utc.timestamp_opt(0, 0).unwrap(),
            duration: Duration::from_millis(1500),
            policy: ScanPolicy::new(["/system/lib64", "/vendor/lib64"], ["libc.so"]).unwrap(),
            outcome: ScanOutcome {
                report: ScanReport {
                    directories: vec!["/system/lib64".into(), "/vendor/lib64".into()],
                    accessible: vec!["/system/lib64/libc.so".into()],
                    inaccessible: 4,
                    skipped: vec!["/system/lib64/libdl.so".into()],
                },
                failure,
            },
        }
    }

    pub(crate) fn violation() -> ScanFailure {
        ScanFailure::Violation(Violation::ShouldNotBeAccessible {
            path: "/vendor/lib64/libc.so".into(),
        })
    }

    #[test]
    fn exit_codes_follow_status() {
        assert_eq!(run_with(None).exit_code(), 0);
        assert_eq!(run_with(Some(violation())).exit_code(), 1);

        let io = ScanFailure::ReadDir {
            dir: "/vendor/lib64".into(),
            // ENOENT
            source: std::io::Error::from_raw_os_error(2),
        };
        let run = run_with(Some(io));
        assert_eq!(run.status(), RunStatus::Error);
        assert_eq!(run.exit_code(), 2);
        assert_eq!(run.reason().as_deref(), Some("No such file or directory"));
    }

    #[test]
    fn reason_of_violation() {
        assert_eq!(
            run_with(Some(violation())).reason().as_deref(),
            Some("The library \"/vendor/lib64/libc.so\" should not be accessible")
        );
        assert_eq!(run_with(None).reason(), None);
    }
}
