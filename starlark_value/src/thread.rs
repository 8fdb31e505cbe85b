//! Execution context handed to every builtin call.

use camino::{Utf8Path, Utf8PathBuf};

/// Per-call execution context.
///
/// The thread carries the directory of the script being evaluated so that
/// context-dependent unpackers such as [`crate::LocalPath`] can resolve
/// relative paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Thread {
    base_dir: Utf8PathBuf,
}

impl Thread {
    /// Creates a thread whose relative paths resolve against `base_dir`.
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory relative paths resolve against.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Resolves `path` against the base directory.
    ///
    /// Absolute paths are returned unchanged; the empty string resolves to the
    /// base directory itself.
    #[must_use]
    pub fn abs_path(&self, path: &str) -> Utf8PathBuf {
        if path.is_empty() {
            return self.base_dir.clone();
        }
        let candidate = Utf8Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        }
    }
}
