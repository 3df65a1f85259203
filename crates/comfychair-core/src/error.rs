//! Error taxonomy for the supervisor.
//!
//! Validation and configuration errors are always raised before a process is
//! created. Adapters map [`SupervisorError`] to their own presentation (the
//! CLI maps it to exit codes).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum accepted length of a single argument, in bytes.
pub const MAX_ARGUMENT_LEN: usize = 8192;

/// Typed rejection reasons produced by the command validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The executable name was empty.
    #[error("command name cannot be empty")]
    EmptyCommand,

    /// An absolute executable path does not exist.
    #[error("command not found: {0}")]
    CommandNotFound(PathBuf),

    /// An absolute executable path points at a directory.
    #[error("command path is a directory: {0}")]
    CommandIsDirectory(PathBuf),

    /// An absolute executable path is not a regular file.
    #[error("command path is not a regular file: {0}")]
    NotARegularFile(PathBuf),

    /// An absolute executable path lacks every execute bit.
    #[error("file is not executable: {0}")]
    NotExecutable(PathBuf),

    /// A bare command name contains a shell metacharacter.
    #[error("command contains dangerous character {character:?}: {command}")]
    DangerousCharacter { command: String, character: char },

    /// A bare command name contains `..`.
    #[error("command contains path traversal sequence: {0}")]
    PathTraversal(String),

    /// An argument contains a NUL byte.
    #[error("invalid argument at position {index}: argument contains null byte")]
    ArgumentContainsNul { index: usize },

    /// An argument exceeds [`MAX_ARGUMENT_LEN`].
    #[error(
        "invalid argument at position {index}: argument too long ({len} bytes, max {MAX_ARGUMENT_LEN})"
    )]
    ArgumentTooLong { index: usize, len: usize },
}

/// Errors returned by supervisor operations.
///
/// None of these terminate the hosting program; every failure is handed back
/// to the caller to render.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The executable or an argument was rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Missing or invalid working directory, log path, or environment entry.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OS refused to create (or wait for) the process.
    #[error("Failed to launch `{command_line}`: {source}")]
    Launch {
        command_line: String,
        #[source]
        source: io::Error,
    },

    /// The PID file could not be read, parsed, written, or removed.
    #[error("PID file error at {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },

    /// Readiness or stop confirmation did not happen in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The process is in a state the action cannot handle.
    #[error("Invalid state: {0}")]
    State(String),
}

impl SupervisorError {
    /// Create a `Configuration` error from any message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a `Persistence` error for a path.
    pub fn persistence(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
