//! Dynamic loader access
//!
//! The scanner talks to the loader through [`LibraryLoader`] so tests can
//! script load outcomes. [`DlopenLoader`] is the real implementation and
//! wraps `dlopen(path, RTLD_NOW)`.
//!
//! Handles are released when dropped. The scanner drops each handle before
//! moving on to the next file, so the loader never sees a library that is
//! still held by an earlier iteration.

use std::ffi::{c_void, CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr::NonNull;

/// One-shot library loading with immediate symbol binding
pub trait LibraryLoader {
    /// Loaded library; dropping it releases the library
    type Handle;

    /// Load `path`, returning the loader's error text verbatim on failure
    fn open(&self, path: &Path) -> Result<Self::Handle, String>;
}

impl<L: LibraryLoader + ?Sized> LibraryLoader for &L {
    type Handle = L::Handle;

    fn open(&self, path: &Path) -> Result<Self::Handle, String> {
        (**self).open(path)
    }
}

/// Loader backed by the platform `dlopen`
#[derive(Debug, Default, Clone, Copy)]
pub struct DlopenLoader;

impl DlopenLoader {
    pub fn new() -> Self {
        Self
    }
}

impl LibraryLoader for DlopenLoader {
    type Handle = LibraryHandle;

    fn open(&self, path: &Path) -> Result<LibraryHandle, String> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            format!(
                "library path \"{}\" contains an interior NUL byte",
                path.display()
            )
        })?;

        // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW) };

        match NonNull::new(raw) {
            Some(handle) => Ok(LibraryHandle { handle }),
            None => Err(last_dl_error()),
        }
    }
}

/// Text of the most recent `dlopen` failure on this thread
fn last_dl_error() -> String {
    // SAFETY: dlerror returns either NULL or a NUL-terminated string owned by
    // the loader, valid until the next dl* call on this thread.
    unsafe {
        let message = libc::dlerror();
        if message.is_null() {
            String::from("dlopen failed without an error message")
        } else {
            CStr::from_ptr(message).to_string_lossy().into_owned()
        }
    }
}

/// A library opened by [`DlopenLoader`]; closed on drop
#[derive(Debug)]
pub struct LibraryHandle {
    handle: NonNull<c_void>,
}

#[cfg(test)]
impl LibraryHandle {
    fn as_ptr(&self) -> *mut c_void {
        self.handle.as_ptr()
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful dlopen and is closed exactly once.
        let rc = unsafe { libc::dlclose(self.handle.as_ptr()) };
        if rc != 0 {
            log_warn!("dlclose failed", "error" => last_dl_error());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn non_library_file_fails_with_loader_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libnotelf.so");
        fs::write(&path, b"this is not an ELF object").unwrap();

        let err = DlopenLoader::new().open(&path).unwrap_err();
        assert!(!err.is_empty());
        if cfg!(target_env = "gnu") {
            assert!(
                err.contains(path.to_str().unwrap()),
                "error should name the path: {err}"
            );
        }
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libmissing.so");
        assert!(DlopenLoader::new().open(&path).is_err());
    }

    #[test]
    fn interior_nul_is_reported() {
        let path = Path::new("/tmp/lib\0bad.so");
        let err = DlopenLoader::new().open(path).unwrap_err();
        assert!(err.contains("interior NUL"));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn system_libc_opens_and_closes() {
        let handle = DlopenLoader::new().open(Path::new("libc.so.6")).unwrap();
        assert!(!handle.as_ptr().is_null());
        drop(handle);
    }
}
