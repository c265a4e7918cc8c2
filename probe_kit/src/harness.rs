//! Test harness entry point
//!
//! The harness calls one function and gets `None` when the platform passes,
//! or a failure reason to show to the user.

use std::path::Path;

use crate::config::{ScanPolicy, VENDOR_PUBLIC_LIBRARIES_FILE};
use crate::loader::{DlopenLoader, LibraryLoader};
use crate::scanner::AccessibilityScanner;
use crate::vendor::{load_public_vendor_libraries, VendorConfigError};

/// Build the policy for this device: compiled-in tables plus the vendor list
pub fn device_policy(vendor_config: &Path) -> Result<ScanPolicy, VendorConfigError> {
    let vendor_libraries = load_public_vendor_libraries(vendor_config).map_err(|e| {
        log_error!("Vendor public library list unreadable", "error" => e);
        e
    })?;

    Ok(ScanPolicy::platform_default().with_public_vendor_libraries(vendor_libraries))
}

/// Run the accessibility check against the real dynamic loader
pub fn run_accessibility_test() -> Option<String> {
    let policy = match device_policy(Path::new(VENDOR_PUBLIC_LIBRARIES_FILE)) {
        Ok(policy) => policy,
        Err(e) => return Some(e.to_string()),
    };
    run_accessibility_test_with(&policy, DlopenLoader::new())
}

/// Run the accessibility check with an explicit policy and loader
pub fn run_accessibility_test_with<L: LibraryLoader>(
    policy: &ScanPolicy,
    loader: L,
) -> Option<String> {
    AccessibilityScanner::new(policy, loader)
        .run()
        .err()
        .map(|failure| failure.reason())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct LoadsEverything;

    impl LibraryLoader for LoadsEverything {
        type Handle = ();

        fn open(&self, _path: &Path) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn device_policy_merges_vendor_list() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("public.libraries.txt");
        fs::write(&config, "# extra\nlibvendorpub.so\n").unwrap();

        let policy = device_policy(&config).unwrap();
        assert!(policy.is_public_vendor_library("libvendorpub.so"));
        assert!(policy.is_public_library("libc.so"));
    }

    #[test]
    fn device_policy_without_vendor_file() {
        let tmp = tempfile::tempdir().unwrap();
        let policy = device_policy(&tmp.path().join("missing.txt")).unwrap();
        assert!(policy.public_vendor_libraries().is_empty());
    }

    #[test]
    fn device_policy_reports_unreadable_vendor_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = device_policy(tmp.path()).unwrap_err();
        assert!(matches!(err, VendorConfigError::Read { ref path, .. } if path == tmp.path()));
    }

    #[test]
    fn passing_scan_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("libc.so"), b"").unwrap();
        let policy = ScanPolicy::new([tmp.path()], ["libc.so"]).unwrap();

        assert_eq!(run_accessibility_test_with(&policy, LoadsEverything), None);
    }

    #[test]
    fn violation_returns_reason() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = tmp.path().join("libfoo.so");
        fs::write(&lib, b"").unwrap();
        let policy = ScanPolicy::new([tmp.path()], ["libc.so"]).unwrap();

        assert_eq!(
            run_accessibility_test_with(&policy, LoadsEverything),
            Some(format!("The library \"{}\" should not be accessible", lib.display()))
        );
    }
}
