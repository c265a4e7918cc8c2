//! Scan policy configuration
//!
//! The root paths and the public library allow-list are fixed at build time.
//! They are gathered into a [`ScanPolicy`] value that is handed to the scanner,
//! so tests can substitute their own tables.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Library directories scanned on 64-bit targets, canonical directory first
#[cfg(target_pointer_width = "64")]
pub const DEFAULT_LIBRARY_PATHS: [&str; 2] = ["/system/lib64", "/vendor/lib64"];

/// Library directories scanned on 32-bit targets, canonical directory first
#[cfg(not(target_pointer_width = "64"))]
pub const DEFAULT_LIBRARY_PATHS: [&str; 2] = ["/system/lib", "/vendor/lib"];

/// Libraries that code loaded by an app classloader may link against
pub const PUBLIC_LIBRARIES: &[&str] = &[
    "libandroid.so",
    "libcamera2ndk.so",
    "libc.so",
    "libdl.so",
    "libEGL.so",
    "libGLESv1_CM.so",
    "libGLESv2.so",
    "libGLESv3.so",
    "libicui18n.so",
    "libicuuc.so",
    "libjnigraphics.so",
    "liblog.so",
    "libmediandk.so",
    "libm.so",
    "libOpenMAXAL.so",
    "libOpenSLES.so",
    "libRS.so",
    "libstdc++.so",
    "libvulkan.so",
    "libwebviewchromium_plat_support.so",
    "libz.so",
];

/// Base name of the library that is never loaded by the probe.
///
/// The probe already depends on it to call `dlopen`, and the linker reports
/// it under an alias, so its accessibility cannot be judged.
pub const EXCLUDED_LIBRARY_NAME: &str = "libdl.so";

/// Vendor list of extra public libraries
pub const VENDOR_PUBLIC_LIBRARIES_FILE: &str = "/vendor/etc/public.libraries.txt";

/// Root paths for the current target word size
pub fn default_library_paths() -> Vec<PathBuf> {
    DEFAULT_LIBRARY_PATHS.iter().map(PathBuf::from).collect()
}

/// Errors raised while building a policy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// At least one root path is required; the first one is canonical
    #[error("scan policy requires at least one root path")]
    NoRoots,
}

/// Immutable inputs of one accessibility scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanPolicy {
    root_paths: Vec<PathBuf>,
    canonical_root: PathBuf,
    public_libraries: BTreeSet<String>,
    public_vendor_libraries: BTreeSet<String>,
    excluded_library: PathBuf,
}

impl ScanPolicy {
    /// Create a policy from explicit tables.
    ///
    /// The excluded library defaults to `libdl.so` in the canonical root and
    /// the vendor list starts empty.
    pub fn new<P, L, S>(root_paths: P, public_libraries: L) -> Result<Self, PolicyError>
    where
        P: IntoIterator,
        P::Item: Into<PathBuf>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let root_paths: Vec<PathBuf> = root_paths.into_iter().map(Into::into).collect();
        let canonical_root = root_paths.first().ok_or(PolicyError::NoRoots)?.clone();

        Ok(Self {
            public_libraries: public_libraries.into_iter().map(Into::into).collect(),
            public_vendor_libraries: BTreeSet::new(),
            excluded_library: canonical_root.join(EXCLUDED_LIBRARY_NAME),
            canonical_root,
            root_paths,
        })
    }

    /// The policy baked into this build
    pub fn platform_default() -> Self {
        let canonical_root = PathBuf::from(DEFAULT_LIBRARY_PATHS[0]);
        Self {
            excluded_library: canonical_root.join(EXCLUDED_LIBRARY_NAME),
            canonical_root,
            root_paths: default_library_paths(),
            public_libraries: PUBLIC_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            public_vendor_libraries: BTreeSet::new(),
        }
    }

    /// Add libraries that are public when found in the vendor root
    pub fn with_public_vendor_libraries<L, S>(mut self, libraries: L) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_vendor_libraries
            .extend(libraries.into_iter().map(Into::into));
        self
    }

    /// Replace the excluded library path
    pub fn with_excluded_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded_library = path.into();
        self
    }

    pub fn root_paths(&self) -> &[PathBuf] {
        &self.root_paths
    }

    /// First root path; only libraries directly inside it can be public
    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    /// Second root path, where vendor public libraries live
    pub fn vendor_root(&self) -> Option<&Path> {
        self.root_paths.get(1).map(PathBuf::as_path)
    }

    pub fn public_libraries(&self) -> &BTreeSet<String> {
        &self.public_libraries
    }

    pub fn public_vendor_libraries(&self) -> &BTreeSet<String> {
        &self.public_vendor_libraries
    }

    pub fn excluded_library(&self) -> &Path {
        &self.excluded_library
    }

    pub fn is_public_library(&self, name: &str) -> bool {
        self.public_libraries.contains(name)
    }

    pub fn is_public_vendor_library(&self, name: &str) -> bool {
        self.public_vendor_libraries.contains(name)
    }

    /// Exact-path check against the excluded library
    pub fn is_excluded(&self, path: &Path) -> bool {
        path == self.excluded_library
    }
}
