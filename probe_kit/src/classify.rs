//! Load outcome classification
//!
//! A library is expected to be accessible when its base name is public and it
//! sits directly in the canonical root, or when it is a vendor public library
//! sitting directly in the vendor root. Everything else must be rejected by the
//! linker with the classloader namespace error.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Namespace the probe's libraries are loaded into
pub const CLASSLOADER_NAMESPACE: &str = "classloader-namespace";

/// Outcome of a load that matched the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    CorrectlyAccessible,
    CorrectlyInaccessible,
}

/// Load outcome that contradicts the policy
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("The library \"{}\" should be accessible but isn't: {error}", .path.display())]
    ShouldBeAccessible { path: PathBuf, error: String },

    #[error("The library \"{}\" should not be accessible", .path.display())]
    ShouldNotBeAccessible { path: PathBuf },

    #[error("unexpected dlerror: {error}")]
    UnexpectedError { path: PathBuf, error: String },
}

impl Violation {
    /// Library the violation was observed on
    pub fn path(&self) -> &Path {
        match self {
            Violation::ShouldBeAccessible { path, .. }
            | Violation::ShouldNotBeAccessible { path }
            | Violation::UnexpectedError { path, .. } => path,
        }
    }
}

/// Whether the policy says `path` may be loaded from the restricted namespace
pub fn expected_accessible(policy: &crate::ScanPolicy, path: &Path) -> bool {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name().and_then(|n| n.to_str()))
    else {
        return false;
    };

    if policy.is_public_library(name) && dir == policy.canonical_root() {
        return true;
    }

    policy.is_public_vendor_library(name) && policy.vendor_root() == Some(dir)
}

/// Whether a failed load was rejected by namespace isolation, and not by
/// anything else
pub fn is_expected_load_error(path: &Path, message: &str) -> bool {
    let prefix = format!("dlopen failed: library \"{}\"", path.display());
    let namespace = format!("is not accessible for the namespace \"{CLASSLOADER_NAMESPACE}\"");

    message.starts_with(&prefix) && message.contains(&namespace)
}

/// Compare an observed load outcome with the policy
pub fn classify<H>(
    policy: &crate::ScanPolicy,
    path: &Path,
    outcome: &Result<H, String>,
) -> Result<Classification, Violation> {
    match (expected_accessible(policy, path), outcome) {
        (true, Ok(_)) => Ok(Classification::CorrectlyAccessible),
        (true, Err(error)) => Err(Violation::ShouldBeAccessible {
            path: path.to_path_buf(),
            error: error.clone(),
        }),
        (false, Ok(_)) => Err(Violation::ShouldNotBeAccessible {
            path: path.to_path_buf(),
        }),
        (false, Err(error)) if is_expected_load_error(path, error) => {
            Ok(Classification::CorrectlyInaccessible)
        }
        (false, Err(error)) => Err(Violation::UnexpectedError {
            path: path.to_path_buf(),
            error: error.clone(),
        }),
    }
}
