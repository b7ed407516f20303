//! Sanitized output file name.

use sanitize_filename::Options;

/// A single path component that is safe to create inside a [`DestDir`].
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`SafeName::sanitize`]
/// - Contains no path separators, no control characters and no `..` runs
/// - Is never empty, `.` or `..`
///
/// [`DestDir`]: super::DestDir
///
/// # Examples
///
/// ```
/// use docusplit_core::types::SafeName;
///
/// let name = SafeName::sanitize("../../etc/passwd", '_').unwrap();
/// assert!(!name.as_str().contains('/'));
/// assert!(!name.as_str().contains(".."));
///
/// assert!(SafeName::sanitize("", '_').is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeName(String);

impl SafeName {
    /// Sanitizes a declared filename.
    ///
    /// Characters that are illegal in file names on any supported platform
    /// (path separators, `<>:"|?*`, control characters) are replaced with
    /// `placeholder`; Windows reserved names are rewritten and overlong names
    /// truncated. Runs of two or more dots are then collapsed to one, so no
    /// parent-directory sequence survives.
    ///
    /// Returns `None` when nothing usable remains.
    #[must_use]
    pub fn sanitize(raw: &str, placeholder: char) -> Option<Self> {
        let mut buf = [0u8; 4];
        let replacement: &str = placeholder.encode_utf8(&mut buf);

        let cleaned = sanitize_filename::sanitize_with_options(
            raw,
            Options {
                windows: true,
                truncate: true,
                replacement,
            },
        );
        let collapsed = collapse_dot_runs(cleaned.trim());

        match collapsed.as_str() {
            "" | "." => None,
            _ => Some(Self(collapsed)),
        }
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts into the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SafeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SafeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn collapse_dot_runs(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_dot = false;
    for c in name.chars() {
        if c == '.' {
            if previous_dot {
                continue;
            }
            previous_dot = true;
        } else {
            previous_dot = false;
        }
        out.push(c);
    }
    out
}
