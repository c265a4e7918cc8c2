//! Vendor public library list
//!
//! Devices may declare extra public libraries in
//! `/vendor/etc/public.libraries.txt`, one base name per line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VendorConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse the contents of a `public.libraries.txt` file
///
/// Lines are trimmed; blank lines and `#` comments are skipped.
pub fn parse_public_libraries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read the vendor list; a missing file means no vendor libraries
pub fn load_public_vendor_libraries(path: &Path) -> Result<Vec<String>, VendorConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let libraries = parse_public_libraries(&text);
            log_debug!(
                "Loaded vendor public libraries",
                "path" => path.display(),
                "count" => libraries.len()
            );
            Ok(libraries)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log_debug!("No vendor public library list", "path" => path.display());
            Ok(Vec::new())
        }
        Err(source) => Err(VendorConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
