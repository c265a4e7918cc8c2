//! # Probe Kit
//!
//! Linker namespace accessibility probe.
//! Walks the platform library directories, attempts to load every library found
//! and checks the outcome against the public library policy.
//!
//! ## Modules
//!
//! - `config` - Root paths, public library allow-list and the excluded library
//! - `vendor` - Parsing of the vendor `public.libraries.txt` file
//! - `loader` - Dynamic loader seam (`dlopen` with immediate binding)
//! - `classify` - Accessibility predicate and load outcome classification
//! - `scanner` - Breadth-first traversal of the root paths
//! - `harness` - Single-call entry point returning `None` or a failure reason
//! - `logging` - Logger initialization and structured log macros
//!
//! ## Usage
//!
//! ```rust,ignore
//! use probe_kit::config::ScanPolicy;
//! use probe_kit::loader::DlopenLoader;
//! use probe_kit::scanner::AccessibilityScanner;
//!
//! let policy = ScanPolicy::platform_default();
//! let report = AccessibilityScanner::new(&policy, DlopenLoader::new()).run()?;
//! println!("{} libraries checked", report.libraries_checked());
//! ```

#[macro_use]
pub mod logging;

pub mod classify;
pub mod config;
pub mod harness;
pub mod loader;
pub mod scanner;
pub mod vendor;

pub use classify::{Classification, Violation};
pub use config::{PolicyError, ScanPolicy};
pub use harness::{device_policy, run_accessibility_test, run_accessibility_test_with};
pub use loader::{DlopenLoader, LibraryHandle, LibraryLoader};
pub use scanner::{AccessibilityScanner, ScanFailure, ScanReport};
pub use vendor::{load_public_vendor_libraries, parse_public_libraries, VendorConfigError};
