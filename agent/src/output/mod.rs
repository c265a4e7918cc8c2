//! Output generation module
//!
//! Provides builders for the result file formats:
//! - Full results with policy, traversal report and failure details
//! - Summary (pass/fail and counts)
//! - Console (human-readable)

mod console;
mod full;
mod summary;

pub use console::print_results;
pub use full::build_full_result;
pub use summary::build_summary;

use thiserror::Error;

use crate::config::{OutputFormat, ProbeRun};

/// Agent identity embedded in every result file
pub(crate) const AGENT_ID: &str = "ns-probe";

/// Build output in the specified format
pub fn build_output(run: &ProbeRun, format: OutputFormat) -> Result<String, OutputError> {
    let json = match format {
        OutputFormat::Full => serde_json::to_string_pretty(&build_full_result(run))?,
        OutputFormat::Summary => serde_json::to_string_pretty(&build_summary(run))?,
    };
    Ok(json)
}

/// Errors that can occur during output generation
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}
