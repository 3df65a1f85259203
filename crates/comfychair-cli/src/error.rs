//! CLI-specific error types and mappings.
//!
//! This module provides the error type for the CLI adapter and the mapping
//! from `SupervisorError` to exit codes and user-facing messages.

use comfychair_core::{PathError, SupervisorError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The executable or an argument was rejected.
    #[error("Invalid command: {0}")]
    Validation(String),

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Process creation error.
    #[error("Process error: {0}")]
    Process(String),

    /// The worker did not react in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Anything else the supervisor refused to do.
    #[error("{0}")]
    State(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::State(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Validation(_) => 65, // EX_DATAERR
            Self::Process(_) => 71,    // EX_OSERR
            Self::Io(_) => 74,         // EX_IOERR
            Self::Timeout(_) => 75,    // EX_TEMPFAIL
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::Validation(e) => Self::Validation(e.to_string()),
            SupervisorError::Configuration(msg) => Self::Config(msg),
            e @ SupervisorError::Launch { .. } => Self::Process(e.to_string()),
            e @ SupervisorError::Persistence { .. } => Self::Io(e.to_string()),
            SupervisorError::Timeout(msg) => Self::Timeout(msg),
            SupervisorError::State(msg) => Self::State(msg),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::Io(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::State(format!("cannot render JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comfychair_core::ValidationError;

    #[test]
    fn supervisor_errors_map_to_sysexits() {
        let cases = [
            (SupervisorError::from(ValidationError::EmptyCommand), 65),
            (SupervisorError::configuration("no environments"), 78),
            (
                SupervisorError::Launch {
                    command_line: "python main.py".to_string(),
                    source: std::io::Error::other("boom"),
                },
                71,
            ),
            (SupervisorError::persistence("/tmp/x.pid", "denied"), 74),
            (SupervisorError::Timeout("still running".to_string()), 75),
            (SupervisorError::State("odd".to_string()), 1),
        ];

        for (err, code) in cases {
            assert_eq!(CliError::from(err).exit_code(), code);
        }
    }

    #[test]
    fn launch_error_keeps_command_line() {
        let err = CliError::from(SupervisorError::Launch {
            command_line: "python main.py --port 8188".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(err.to_string().contains("python main.py --port 8188"));
    }
}
