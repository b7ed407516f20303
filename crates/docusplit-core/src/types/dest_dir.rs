//! Validated destination directory type.

use crate::DocuError;
use crate::Result;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::SafeName;

/// A validated destination directory for writing embedded files.
///
/// Once constructed, a `DestDir` is guaranteed to:
/// - Exist on the filesystem (it is created when missing, if allowed)
/// - Be a directory (not a file)
/// - Be writable by the current process
/// - Be represented as an absolute canonical path
///
/// # Examples
///
/// ```no_run
/// use docusplit_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::prepare("/tmp/recovered", true)?;
/// println!("Writing to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Validates `path` as an extraction root, creating it when missing and
    /// `create_missing` is set.
    ///
    /// # Validation
    ///
    /// 1. Rejects an empty path
    /// 2. Resolves the path to an absolute path
    /// 3. Rejects a path that exists but is not a directory
    /// 4. Creates the directory and its parents if it does not exist
    /// 5. Canonicalizes the path
    /// 6. Checks write permissions (Unix)
    ///
    /// Nothing is written into the directory by this call.
    ///
    /// # Errors
    ///
    /// Returns [`DocuError::DestinationInvalid`] when any step fails.
    pub fn prepare(path: impl AsRef<Path>, create_missing: bool) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason: String| DocuError::DestinationInvalid {
            path: path.to_path_buf(),
            reason,
        };

        if path.as_os_str().is_empty() {
            return Err(invalid("destination path is empty".into()));
        }

        let absolute = std::path::absolute(path)
            .map_err(|e| invalid(format!("cannot resolve absolute path: {e}")))?;

        match fs::metadata(&absolute) {
            Ok(meta) if !meta.is_dir() => {
                return Err(invalid("path exists and is not a directory".into()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !create_missing {
                    return Err(invalid("directory does not exist".into()));
                }
                fs::create_dir_all(&absolute)
                    .map_err(|e| invalid(format!("cannot create directory: {e}")))?;
            }
            Err(e) => return Err(invalid(format!("cannot inspect path: {e}"))),
        }

        let canonical = absolute
            .canonicalize()
            .map_err(|e| invalid(format!("failed to canonicalize: {e}")))?;

        #[cfg(unix)]
        {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            let path_cstring = CString::new(canonical.as_os_str().as_bytes())
                .map_err(|_| invalid("path contains null byte".into()))?;

            // SAFETY: access() only reads the NUL-terminated string, which
            // outlives the call.
            #[allow(unsafe_code)]
            let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK) };

            if result != 0 {
                return Err(invalid("directory is not writable".into()));
            }
        }

        #[cfg(not(unix))]
        {
            let meta = fs::metadata(&canonical)
                .map_err(|e| invalid(format!("cannot inspect path: {e}")))?;
            if meta.permissions().readonly() {
                return Err(invalid("directory is not writable".into()));
            }
        }

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves the write path for `name` and verifies it stays inside
    /// this directory.
    ///
    /// The check is lexical: `name` must be exactly one normal path
    /// component and the joined path must have this directory as its parent.
    ///
    /// # Errors
    ///
    /// Returns [`DocuError::PathTraversal`] when the resolved path would
    /// land anywhere other than directly under the root.
    pub fn resolve(&self, name: &SafeName) -> Result<PathBuf> {
        let candidate = Path::new(name.as_str());
        let mut components = candidate.components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        let joined = self.0.join(candidate);
        if !single_normal || joined.parent() != Some(self.0.as_path()) {
            return Err(DocuError::PathTraversal { path: joined });
        }

        Ok(joined)
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
