//! PID file I/O operations.
//!
//! Format: the whole file is one decimal integer, written without a trailing
//! newline. Surrounding whitespace is tolerated on read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use comfychair_core::SupervisorError;
use thiserror::Error;

/// Why a PID file could not be used.
#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} does not contain a valid pid: {content:?}", path.display())]
    Corrupt { path: PathBuf, content: String },

    #[error("cannot write {}: {source}", path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PidFileError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. }
            | Self::Corrupt { path, .. }
            | Self::Unwritable { path, .. } => path,
        }
    }
}

impl From<PidFileError> for SupervisorError {
    fn from(err: PidFileError) -> Self {
        let reason = match &err {
            PidFileError::Unreadable { source, .. } | PidFileError::Unwritable { source, .. } => {
                source.to_string()
            }
            PidFileError::Corrupt { content, .. } => format!("invalid pid {:?}", content.trim()),
        };
        Self::persistence(err.path().to_path_buf(), reason)
    }
}

/// Write `pid` to `path`, replacing any previous content.
///
/// The parent directory is created if missing.
pub fn write_pid(path: &Path, pid: u32) -> Result<(), PidFileError> {
    let unwritable = |source| PidFileError::Unwritable {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }
    fs::write(path, pid.to_string()).map_err(unwritable)
}

/// Read the pid stored at `path`.
///
/// Returns `Ok(None)` when the file does not exist. Empty content,
/// non-numeric content and pid `0` are reported as [`PidFileError::Corrupt`].
pub fn read_pid(path: &Path) -> Result<Option<u32>, PidFileError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PidFileError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match content.trim().parse::<u32>() {
        Ok(pid) if pid > 0 => Ok(Some(pid)),
        _ => Err(PidFileError::Corrupt {
            path: path.to_path_buf(),
            content,
        }),
    }
}

/// Delete the PID file (idempotent - no error if missing).
pub fn delete_pid(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
