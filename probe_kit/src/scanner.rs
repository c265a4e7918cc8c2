//! Accessibility scanner
//!
//! Breadth-first walk over the policy's root paths. Every regular file is
//! loaded once and the outcome compared with the policy; the walk stops at
//! the first mismatch.
//!
//! ```text
//! queue = roots
//! while dir = queue.pop_front():
//!     for name in read_dir(dir):
//!         path = dir/name
//!         directory        -> queue.push_back(path)
//!         excluded library -> skip
//!         otherwise        -> open(path), classify, release handle
//! ```

use std::collections::VecDeque;
use std::ffi::CStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::classify::{classify, Classification, Violation};
use crate::config::ScanPolicy;
use crate::loader::LibraryLoader;

/// Why a scan did not pass
#[derive(Debug, Error)]
pub enum ScanFailure {
    /// A directory could not be listed; the scan is aborted
    #[error("Failed to read directory {}: {source}", .dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A load outcome contradicted the policy
    #[error(transparent)]
    Violation(#[from] Violation),
}

impl ScanFailure {
    /// Text handed back to the test harness.
    ///
    /// I/O failures are reported as the bare system error text, violations
    /// as their diagnostic.
    pub fn reason(&self) -> String {
        match self {
            ScanFailure::ReadDir { source, .. } => os_error_text(source),
            ScanFailure::Violation(violation) => violation.to_string(),
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, ScanFailure::Violation(_))
    }
}

fn os_error_text(err: &io::Error) -> String {
    match err.raw_os_error() {
        // SAFETY: strerror returns a pointer to a NUL-terminated message that
        // stays valid until the next strerror call on this thread.
        Some(code) => unsafe { CStr::from_ptr(libc::strerror(code)) }
            .to_string_lossy()
            .into_owned(),
        None => err.to_string(),
    }
}

/// What the scanner did with one directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Queued for traversal
    Directory,
    /// Symlink back to one of its own ancestors; not listed again
    Cycle,
    /// The excluded library
    Skipped,
    Classified(Classification),
}

/// Observations of a scan, complete or cut short by a failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Directories listed, in visit order
    pub directories: Vec<PathBuf>,
    /// Libraries that loaded as expected
    pub accessible: Vec<PathBuf>,
    /// Number of libraries rejected with the namespace error
    pub inaccessible: usize,
    /// Entries excluded from checking
    pub skipped: Vec<PathBuf>,
}

impl ScanReport {
    pub fn libraries_checked(&self) -> usize {
        self.accessible.len() + self.inaccessible
    }

    fn record(&mut self, path: &Path, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Directory | EntryOutcome::Cycle => {}
            EntryOutcome::Skipped => self.skipped.push(path.to_path_buf()),
            EntryOutcome::Classified(Classification::CorrectlyAccessible) => {
                self.accessible.push(path.to_path_buf())
            }
            EntryOutcome::Classified(Classification::CorrectlyInaccessible) => {
                self.inaccessible += 1
            }
        }
    }
}

/// Report plus the failure that stopped the scan, if any
#[derive(Debug)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub failure: Option<ScanFailure>,
}

impl ScanOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<ScanReport, ScanFailure> {
        match self.failure {
            None => Ok(self.report),
            Some(failure) => Err(failure),
        }
    }
}

/// Scanner over one policy with one loader
pub struct AccessibilityScanner<'a, L> {
    policy: &'a ScanPolicy,
    loader: L,
}

impl<'a, L: LibraryLoader> AccessibilityScanner<'a, L> {
    pub fn new(policy: &'a ScanPolicy, loader: L) -> Self {
        Self { policy, loader }
    }

    /// Scan and return the report, or the first failure
    pub fn run(&self) -> Result<ScanReport, ScanFailure> {
        self.scan().into_result()
    }

    /// Scan and keep the partial report when a failure stops the walk
    pub fn scan(&self) -> ScanOutcome {
        let mut report = ScanReport::default();
        let failure = self.walk(&mut report).err();

        match &failure {
            None => log_info!(
                "Accessibility scan passed",
                "directories" => report.directories.len(),
                "accessible" => report.accessible.len(),
                "inaccessible" => report.inaccessible
            ),
            Some(failure) => log_warn!(
                "Accessibility scan failed",
                "directories" => report.directories.len(),
                "checked" => report.libraries_checked(),
                "reason" => failure
            ),
        }

        ScanOutcome { report, failure }
    }

    fn walk(&self, report: &mut ScanReport) -> Result<(), ScanFailure> {
        let mut queue: VecDeque<PendingDirectory> = self
            .policy
            .root_paths()
            .iter()
            .map(|root| PendingDirectory::root(root))
            .collect();

        log_info!(
            "Starting accessibility scan",
            "roots" => queue.len(),
            "public_libraries" => self.policy.public_libraries().len(),
            "vendor_libraries" => self.policy.public_vendor_libraries().len()
        );

        while let Some(pending) = queue.pop_front() {
            let dir = &pending.path;
            report.directories.push(dir.clone());

            let entries = fs::read_dir(dir).map_err(|source| ScanFailure::ReadDir {
                dir: dir.clone(),
                source,
            })?;

            for entry in entries {
                let entry = entry.map_err(|source| ScanFailure::ReadDir {
                    dir: dir.clone(),
                    source,
                })?;
                let path = dir.join(entry.file_name());

                let outcome = self.visit(&path, &pending, &mut queue)?;
                log_debug!("Checked entry", "path" => path.display(), "outcome" => format!("{outcome:?}"));
                report.record(&path, outcome);
            }
        }

        Ok(())
    }

    /// Handle one entry of the `parent` directory
    fn visit(
        &self,
        path: &Path,
        parent: &PendingDirectory,
        queue: &mut VecDeque<PendingDirectory>,
    ) -> Result<EntryOutcome, Violation> {
        if let Some(id) = directory_id(path) {
            return Ok(match parent.child(path, id) {
                Some(child) => {
                    queue.push_back(child);
                    EntryOutcome::Directory
                }
                None => EntryOutcome::Cycle,
            });
        }

        if self.policy.is_excluded(path) {
            return Ok(EntryOutcome::Skipped);
        }

        // The handle lives only for this block, on every path out of it
        let verdict = {
            let loaded = self.loader.open(path);
            classify(self.policy, path, &loaded)
        };

        verdict.map(EntryOutcome::Classified)
    }
}

/// Device and inode of a directory
type DirectoryId = (u64, u64);

/// Identity of `path` when it is a directory, following symlinks like `stat`
fn directory_id(path: &Path) -> Option<DirectoryId> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_dir())
        .map(|meta| (meta.dev(), meta.ino()))
}

/// A queued directory and the identities of the directories above it on the
/// path that reached it, itself included
struct PendingDirectory {
    path: PathBuf,
    ancestors: Vec<DirectoryId>,
}

impl PendingDirectory {
    fn root(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            // Unreadable roots still have to be listed so the failure surfaces
            ancestors: directory_id(path).into_iter().collect(),
        }
    }

    /// Subdirectory to queue, or None when `id` is already one of its
    /// ancestors and listing it would never end
    fn child(&self, path: &Path, id: DirectoryId) -> Option<Self> {
        if self.ancestors.contains(&id) {
            return None;
        }
        let mut ancestors = self.ancestors.clone();
        ancestors.push(id);
        Some(Self {
            path: path.to_path_buf(),
            ancestors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Loader that refuses everything with the namespace error
    struct DenyAll {
        opened: RefCell<Vec<PathBuf>>,
    }

    impl LibraryLoader for DenyAll {
        type Handle = ();

        fn open(&self, path: &Path) -> Result<(), String> {
            self.opened.borrow_mut().push(path.to_path_buf());
            Err(format!(
                "dlopen failed: library \"{}\" needed or dlopened by \"/system/lib64/libnativeloader.so\" \
                 is not accessible for the namespace \"classloader-namespace\"",
                path.display()
            ))
        }
    }

    #[test]
    fn nested_directories_are_visited_breadth_first() {
        let tmp = tempfile::tempdir().unwrap();
        let system = tmp.path().join("system");
        let vendor = tmp.path().join("vendor");
        fs::create_dir_all(system.join("a/deep")).unwrap();
        fs::create_dir_all(&vendor).unwrap();
        fs::write(system.join("a/deep/libx.so"), b"").unwrap();

        let policy = ScanPolicy::new([&system, &vendor], ["libc.so"]).unwrap();
        let loader = DenyAll {
            opened: RefCell::new(Vec::new()),
        };
        let report = AccessibilityScanner::new(&policy, &loader).run().unwrap();

        assert_eq!(
            report.directories,
            vec![
                system.clone(),
                vendor.clone(),
                system.join("a"),
                system.join("a/deep")
            ]
        );
        assert_eq!(report.inaccessible, 1);
        assert_eq!(*loader.opened.borrow(), vec![system.join("a/deep/libx.so")]);
    }

    #[test]
    fn symlinked_directory_is_listed_once() {
        let tmp = tempfile::tempdir().unwrap();
        let system = tmp.path().join("system");
        fs::create_dir_all(system.join("real")).unwrap();
        fs::write(system.join("real/libx.so"), b"").unwrap();
        std::os::unix::fs::symlink(&system, system.join("real/loop")).unwrap();

        let policy = ScanPolicy::new([&system], ["libc.so"]).unwrap();
        let loader = DenyAll {
            opened: RefCell::new(Vec::new()),
        };
        let report = AccessibilityScanner::new(&policy, &loader).run().unwrap();

        assert_eq!(report.directories, vec![system.clone(), system.join("real")]);
        assert_eq!(report.libraries_checked(), 1);
    }

    #[test]
    fn missing_root_reports_system_error_text() {
        let tmp = tempfile::tempdir().unwrap();
        let policy = ScanPolicy::new([tmp.path().join("absent")], ["libc.so"]).unwrap();
        let loader = DenyAll {
            opened: RefCell::new(Vec::new()),
        };

        let failure = AccessibilityScanner::new(&policy, &loader).run().unwrap_err();
        assert!(!failure.is_violation());
        assert_eq!(failure.reason(), "No such file or directory");
        assert!(failure.to_string().starts_with("Failed to read directory "));
    }

    #[test]
    fn report_serializes() {
        let report = ScanReport {
            directories: vec![PathBuf::from("/system/lib64")],
            accessible: vec![PathBuf::from("/system/lib64/libc.so")],
            inaccessible: 3,
            skipped: vec![PathBuf::from("/system/lib64/libdl.so")],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["inaccessible"], 3);
        assert_eq!(json["accessible"][0], "/system/lib64/libc.so");
    }
}
