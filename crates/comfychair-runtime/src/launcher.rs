//! Worker process creation.
//!
//! Two modes:
//! - **Foreground**: inherits the terminal, blocks until the worker exits
//! - **Background**: detached into its own process group with stdout and
//!   stderr appended to the log file
//!
//! [`preflight`] runs every check that can fail without side effects, so a
//! rejected request never leaves a process or a log file behind.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use comfychair_core::{LaunchMode, SupervisorError, ValidationError};
use thiserror::Error;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::validate::validate_invocation;

/// Everything needed to create one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub work_dir: Option<PathBuf>,
    /// Required in background mode.
    pub log_file: Option<PathBuf>,
    pub mode: LaunchMode,
}

impl LaunchRequest {
    /// Human-readable command line, used in errors and dry-run output.
    pub fn command_line(&self) -> String {
        format_command_line(&self.executable, &self.args)
    }
}

/// A successfully created worker.
#[derive(Debug)]
pub enum Launched {
    /// The worker ran to completion.
    Foreground { pid: Option<u32>, exit: ExitStatus },
    /// The worker is running detached; the caller owns the handle.
    Background { child: Child, pid: u32 },
}

/// Launch failures, kept distinct from "ran and exited non-zero".
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    InvalidCommand(#[from] ValidationError),

    #[error("working directory {} {reason}", path.display())]
    InvalidWorkDir { path: PathBuf, reason: &'static str },

    #[error("background launch requires a log file path")]
    MissingLogPath,

    #[error("cannot open log file {}: {source}", path.display())]
    LogOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start `{command_line}`: {source}")]
    Start {
        command_line: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for `{command_line}`: {source}")]
    Wait {
        command_line: String,
        #[source]
        source: io::Error,
    },
}

impl From<LaunchError> for SupervisorError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::InvalidCommand(e) => Self::Validation(e),
            e @ (LaunchError::InvalidWorkDir { .. }
            | LaunchError::MissingLogPath
            | LaunchError::LogOpen { .. }) => Self::Configuration(e.to_string()),
            LaunchError::Start {
                command_line,
                source,
            }
            | LaunchError::Wait {
                command_line,
                source,
            } => Self::Launch {
                command_line,
                source,
            },
        }
    }
}

/// Check a request without creating anything.
pub fn preflight(request: &LaunchRequest) -> Result<(), LaunchError> {
    validate_invocation(&request.executable, &request.args)?;

    if let Some(dir) = &request.work_dir {
        if !dir.exists() {
            return Err(LaunchError::InvalidWorkDir {
                path: dir.clone(),
                reason: "does not exist",
            });
        }
        if !dir.is_dir() {
            return Err(LaunchError::InvalidWorkDir {
                path: dir.clone(),
                reason: "is not a directory",
            });
        }
    }

    if request.mode.is_background() && background_log(request).is_none() {
        return Err(LaunchError::MissingLogPath);
    }

    Ok(())
}

/// Create the worker process.
pub async fn launch(request: &LaunchRequest) -> Result<Launched, LaunchError> {
    preflight(request)?;

    match request.mode {
        LaunchMode::Foreground => launch_foreground(request).await,
        LaunchMode::Background => launch_background(request),
    }
}

async fn launch_foreground(request: &LaunchRequest) -> Result<Launched, LaunchError> {
    let command_line = request.command_line();
    let mut cmd = tokio::process::Command::from(base_command(request));
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let mut child = cmd.spawn().map_err(|source| LaunchError::Start {
        command_line: command_line.clone(),
        source,
    })?;
    let pid = child.id();
    info!(pid = ?pid, command = %command_line, "Worker started in foreground");

    // The worker shares our process group, so Ctrl+C reaches it directly.
    // Absorb the interrupt here and keep waiting for its exit.
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => debug!(pid = ?pid, "Interrupt received, waiting for worker to exit"),
                Err(e) => {
                    warn!(error = %e, "Cannot listen for interrupts");
                    break child.wait().await;
                }
            },
        }
    };

    let exit = status.map_err(|source| LaunchError::Wait {
        command_line,
        source,
    })?;
    debug!(pid = ?pid, status = %exit, "Foreground worker exited");
    Ok(Launched::Foreground { pid, exit })
}

fn launch_background(request: &LaunchRequest) -> Result<Launched, LaunchError> {
    let command_line = request.command_line();
    let log_path = background_log(request).ok_or(LaunchError::MissingLogPath)?;

    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| LaunchError::LogOpen {
            path: log_path.to_path_buf(),
            source,
        })?;
    let log_err = log.try_clone().map_err(|source| LaunchError::LogOpen {
        path: log_path.to_path_buf(),
        source,
    })?;

    let mut std_cmd = base_command(request);
    std_cmd
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));
    detach(&mut std_cmd);

    // Our copies of the log handles are dropped with the command.
    let mut cmd = tokio::process::Command::from(std_cmd);
    let child = cmd.spawn().map_err(|source| LaunchError::Start {
        command_line: command_line.clone(),
        source,
    })?;
    drop(cmd);

    let pid = child.id().ok_or_else(|| LaunchError::Start {
        command_line: command_line.clone(),
        source: io::Error::other("worker exited before its pid could be read"),
    })?;

    info!(
        pid,
        command = %command_line,
        log = %log_path.display(),
        "Worker started in background"
    );
    Ok(Launched::Background { child, pid })
}

fn base_command(request: &LaunchRequest) -> std::process::Command {
    let mut cmd = std::process::Command::new(&request.executable);
    cmd.args(&request.args);
    if let Some(dir) = &request.work_dir {
        cmd.current_dir(dir);
    }
    cmd
}

fn background_log(request: &LaunchRequest) -> Option<&Path> {
    request
        .log_file
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
}

/// Put the worker in its own process group so terminal signals aimed at us
/// do not reach it.
#[cfg(unix)]
fn detach(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut std::process::Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut std::process::Command) {}

/// Render an executable and arguments the way a user would type them.
pub fn format_command_line<S: AsRef<str>>(executable: &Path, args: &[S]) -> String {
    let mut parts = vec![quote(&executable.to_string_lossy())];
    parts.extend(args.iter().map(|a| quote(a.as_ref())));
    parts.join(" ")
}

fn quote(part: &str) -> String {
    if part.is_empty() || part.chars().any(char::is_whitespace) {
        format!("\"{part}\"")
    } else {
        part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request(mode: LaunchMode) -> LaunchRequest {
        LaunchRequest {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "exit 3".to_string()],
            work_dir: None,
            log_file: None,
            mode,
        }
    }

    #[test]
    fn command_line_quotes_whitespace() {
        let line = format_command_line(Path::new("python"), &["main.py", "a b"]);
        assert_eq!(line, "python main.py \"a b\"");
    }

    #[test]
    fn missing_work_dir_fails_preflight() {
        let mut req = request(LaunchMode::Foreground);
        req.work_dir = Some(PathBuf::from("/nonexistent/comfy/lounge"));
        assert!(matches!(
            preflight(&req),
            Err(LaunchError::InvalidWorkDir { .. })
        ));
    }

    #[test]
    fn work_dir_that_is_a_file_fails_preflight() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let mut req = request(LaunchMode::Foreground);
        req.work_dir = Some(file);
        assert!(matches!(
            preflight(&req),
            Err(LaunchError::InvalidWorkDir { .. })
        ));
    }

    #[test]
    fn background_without_log_path_is_configuration_error() {
        let mut req = request(LaunchMode::Background);
        req.log_file = Some(PathBuf::new());
        let err = preflight(&req).unwrap_err();
        assert!(matches!(err, LaunchError::MissingLogPath));
        assert!(matches!(
            SupervisorError::from(err),
            SupervisorError::Configuration(_)
        ));
    }

    #[test]
    fn validation_failure_maps_to_validation_error() {
        let mut req = request(LaunchMode::Foreground);
        req.executable = PathBuf::from("sh;reboot");
        let err = SupervisorError::from(preflight(&req).unwrap_err());
        assert!(matches!(err, SupervisorError::Validation(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn foreground_reports_nonzero_exit_as_success() {
        let launched = launch(&request(LaunchMode::Foreground)).await.unwrap();
        match launched {
            Launched::Foreground { exit, .. } => assert_eq!(exit.code(), Some(3)),
            Launched::Background { .. } => panic!("expected foreground"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn background_output_goes_to_log() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("comfyui.log");

        let req = LaunchRequest {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "echo out; echo err >&2".to_string()],
            work_dir: Some(dir.path().to_path_buf()),
            log_file: Some(log.clone()),
            mode: LaunchMode::Background,
        };

        let Launched::Background { mut child, pid } = launch(&req).await.unwrap() else {
            panic!("expected background");
        };
        assert!(pid > 0);
        child.wait().await.unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert!(contents.contains("out"));
        assert!(contents.contains("err"));
    }

    #[tokio::test]
    async fn unknown_executable_is_a_start_error() {
        let mut req = request(LaunchMode::Foreground);
        req.executable = PathBuf::from("comfy-chair-no-such-binary");
        let err = launch(&req).await.unwrap_err();
        match err {
            LaunchError::Start { command_line, .. } => {
                assert!(command_line.starts_with("comfy-chair-no-such-binary"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
