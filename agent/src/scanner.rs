//! Core scanning logic
//!
//! Builds the device policy, runs the accessibility scan and hands the
//! result to the output builders.

use std::time::Instant;

use chrono::Utc;
use probe_kit::scanner::AccessibilityScanner;
use probe_kit::{device_policy, log_info, DlopenLoader, ScanPolicy, VendorConfigError};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ProbeRun, ScanConfig};
use crate::output;

/// Run the probe with the given configuration, returning the exit code
pub fn run_scan(config: &ScanConfig) -> Result<i32, ScanError> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let start = Instant::now();

    let policy = build_policy(config)?;

    log_info!(
        "Starting probe run",
        "run_id" => run_id,
        "roots" => policy.root_paths().len()
    );
    if !config.quiet {
        println!();
        println!("Linker Namespace Probe v{}", env!("CARGO_PKG_VERSION"));
        println!("Scanning {} library root(s)...", policy.root_paths().len());
        println!();
    }

    let outcome = AccessibilityScanner::new(&policy, DlopenLoader::new()).scan();

    let run = ProbeRun {
        run_id,
        started_at,
        duration: start.elapsed(),
        policy,
        outcome,
    };

    if !config.quiet {
        output::print_results(&run);
        print_execution_info(&run, config);
    }

    if let Some(output_path) = &config.output_file {
        save_output(&run, config)?;

        if !config.quiet {
            println!("Results saved to: {}", output_path.display());
            println!();
        }
    }

    log_info!(
        "Probe run completed",
        "run_id" => run.run_id,
        "status" => run.status().as_str(),
        "checked" => run.outcome.report.libraries_checked()
    );

    Ok(run.exit_code())
}

/// Compiled-in tables plus the device's vendor list
fn build_policy(config: &ScanConfig) -> Result<ScanPolicy, ScanError> {
    device_policy(&config.vendor_config).map_err(ScanError::VendorConfig)
}

/// Save output to file
fn save_output(run: &ProbeRun, config: &ScanConfig) -> Result<(), ScanError> {
    let output_path = match &config.output_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let json = output::build_output(run, config.output_format)?;

    std::fs::write(output_path, &json)
        .map_err(|e| ScanError::WriteFile(output_path.display().to_string(), e))?;

    Ok(())
}

/// Print execution information
fn print_execution_info(run: &ProbeRun, config: &ScanConfig) {
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!("  Run ID:       {}", run.run_id);
    println!("  Duration:     {:.2}s", run.duration.as_secs_f64());
    if let Some(output_path) = &config.output_file {
        println!(
            "  Output:       {} ({})",
            output_path.display(),
            config.output_format
        );
    }
    println!("────────────────────────────────────────────────────────────────────────────────");
    println!();
}

/// Errors that stop the probe before or after scanning
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Vendor configuration failed: {0}")]
    VendorConfig(#[source] VendorConfigError),

    #[error("Output generation failed: {0}")]
    Output(#[from] output::OutputError),

    #[error("Failed to write {0}: {1}")]
    WriteFile(String, #[source] std::io::Error),
}
