//! Command-line interface parsing

use std::path::PathBuf;

use clap::Parser;
use probe_kit::config::VENDOR_PUBLIC_LIBRARIES_FILE;

use crate::config::{OutputFormat, ScanConfig};

const AFTER_HELP: &str = "\
BEHAVIOR:
    Every library under the platform library directories is loaded once.
    Public libraries in the system directory must load; everything else must be
    rejected with the classloader-namespace error. The scan stops at the first
    mismatch. Results are always printed to the console (unless --quiet is set).

EXIT CODES:
    0    All libraries matched the policy
    1    A library violated the policy
    2    Execution error (unreadable directory, output failure)";

/// Linker namespace accessibility probe
#[derive(Debug, Parser)]
#[command(name = "ns_probe", version, about, after_help = AFTER_HELP)]
pub struct Cli {
    /// Suppress console output
    #[arg(short, long)]
    pub quiet: bool,

    /// Write results to JSON file (optional)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output file format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Full)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn into_config(self) -> ScanConfig {
        ScanConfig {
            output_file: self.output,
            output_format: self.format,
            quiet: self.quiet,
            vendor_config: PathBuf::from(VENDOR_PUBLIC_LIBRARIES_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Cli::try_parse_from(["ns_probe"]).unwrap().into_config();
        assert!(!config.quiet);
        assert_eq!(config.output_file, None);
        assert_eq!(config.output_format, OutputFormat::Full);
        assert_eq!(config.vendor_config, PathBuf::from(VENDOR_PUBLIC_LIBRARIES_FILE));
    }

    #[test]
    fn short_flags() {
        let config = Cli::try_parse_from(["ns_probe", "-q", "-o", "out.json", "-f", "summary"])
            .unwrap()
            .into_config();
        assert!(config.quiet);
        assert_eq!(config.output_file, Some(PathBuf::from("out.json")));
        assert_eq!(config.output_format, OutputFormat::Summary);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["ns_probe", "--format", "attestation"]).is_err());
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["ns_probe", "/system/lib64"]).is_err());
    }

    #[test]
    fn command_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
