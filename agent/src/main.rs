//! # Linker Namespace Probe
//!
//! Checks that the dynamic linker only lets classloader-namespace code load
//! the public platform libraries.
//!
//! ## Usage
//!
//! ```bash
//! # Run the probe, console output only
//! ns_probe
//!
//! # Also write a JSON result file
//! ns_probe --format summary -o summary.json
//! ```
//!
//! ## Output Formats
//!
//! - **full** (default): Policy, traversal report and failure details
//! - **summary**: Pass/fail with counts only

mod cli;
mod config;
mod output;
mod scanner;

use clap::Parser;
use probe_kit::logging;

use cli::Cli;

fn main() {
    if let Err(e) = logging::init_global_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let config = Cli::parse().into_config();

    let exit_code = match scanner::run_scan(&config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };

    std::process::exit(exit_code);
}
