//! Output destinations for generated bindings.

use std::fmt;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};

use crate::error::BindgenError;

/// Command-line value selecting standard output.
pub const STDOUT_SENTINEL: &str = "-";

/// Where generated source is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,
    /// `<dir>/<file_name>`.
    File {
        /// Output directory, created if missing.
        dir: Utf8PathBuf,
        /// File name inside `dir`.
        file_name: String,
    },
}

impl Destination {
    /// Interprets an output argument: [`STDOUT_SENTINEL`] selects standard
    /// output, anything else names a directory.
    #[must_use]
    pub fn from_arg(arg: &Utf8Path, file_name: &str) -> Self {
        if arg.as_str() == STDOUT_SENTINEL {
            Self::Stdout
        } else {
            Self::File {
                dir: arg.to_path_buf(),
                file_name: file_name.to_owned(),
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File { dir, file_name } => write!(f, "{}", dir.join(file_name)),
        }
    }
}

/// Writes `contents` to `destination`, replacing any existing file.
///
/// # Errors
///
/// Returns [`BindgenError::Io`] when the directory cannot be created or the
/// file cannot be written.
pub fn write_output(destination: &Destination, contents: &str) -> Result<(), BindgenError> {
    match destination {
        Destination::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(contents.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|io_err| BindgenError::Io {
                    path: Utf8PathBuf::from(STDOUT_SENTINEL),
                    source: io_err,
                })
        }
        Destination::File { dir, file_name } => {
            let handle = ensure_dir(dir)?;
            let path = dir.join(file_name);
            let mut file = handle
                .open_with(
                    file_name,
                    OpenOptions::new().write(true).create(true).truncate(true),
                )
                .map_err(|io_err| BindgenError::Io {
                    path: path.clone(),
                    source: io_err,
                })?;
            file.write_all(contents.as_bytes())
                .map_err(|io_err| BindgenError::Io {
                    path,
                    source: io_err,
                })
        }
    }
}

fn ensure_dir(path: &Utf8Path) -> Result<Dir, BindgenError> {
    let io_err = |source| BindgenError::Io {
        path: path.to_path_buf(),
        source,
    };
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == std::io::ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority()).map_err(io_err)?;
            Dir::open_ambient_dir(path, ambient_authority()).map_err(io_err)
        }
        Err(open_err) => Err(io_err(open_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, ensure};
    use rstest::rstest;

    #[rstest]
    #[case::sentinel("-", Destination::Stdout)]
    #[case::directory("out/api", Destination::File {
        dir: Utf8PathBuf::from("out/api"),
        file_name: "types.rs".to_owned(),
    })]
    fn interprets_output_arguments(#[case] arg: &str, #[case] expected: Destination) {
        assert_eq!(Destination::from_arg(Utf8Path::new(arg), "types.rs"), expected);
    }

    #[rstest]
    fn creates_missing_directories_and_truncates() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp dir: {}", path.display()))?;
        let destination = Destination::from_arg(&root.join("nested/out"), "types.rs");

        write_output(&destination, "first version, longer\n")?;
        write_output(&destination, "second\n")?;

        let written = std::fs::read_to_string(root.join("nested/out/types.rs"))?;
        ensure!(written == "second\n");
        ensure!(destination.to_string() == root.join("nested/out/types.rs").as_str());
        Ok(())
    }
}
