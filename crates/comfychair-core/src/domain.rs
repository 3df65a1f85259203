//! Lifecycle domain types.
//!
//! Every action returns an outcome value rather than printing. "Already
//! running", "not running" and "aborted" are informational results, not
//! errors; the adapter decides how to render them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// How a worker is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// Attached: inherits the terminal and blocks until exit.
    Foreground,
    /// Detached: output goes to the log file, returns immediately.
    Background,
}

impl LaunchMode {
    pub const fn is_background(self) -> bool {
        matches!(self, Self::Background)
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Foreground => write!(f, "foreground"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// Observable lifecycle state of an environment's worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Stopping,
    /// PID file present but the recorded process is gone.
    Stale,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// One spawned worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedProcess {
    /// OS process id.
    pub pid: u32,
    /// Name of the owning environment.
    pub environment: String,
    /// Executable that was launched.
    pub executable: PathBuf,
    /// Working directory, if one was set.
    pub working_dir: Option<PathBuf>,
    /// Log file receiving stdout/stderr (background only).
    pub log_file: Option<PathBuf>,
    pub mode: LaunchMode,
    /// Port passed to the worker.
    pub port: u16,
    pub started_at: DateTime<Utc>,
}

/// Serializable summary of a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitSummary {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub success: bool,
}

impl From<std::process::ExitStatus> for ExitSummary {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

impl fmt::Display for ExitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Result of waiting for the readiness marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// The marker appeared in the log.
    Ready,
    /// The wait timed out; the worker may still be initializing.
    NotConfirmed { waited: Duration },
    /// The worker exited before printing the marker.
    ExitedEarly { exit: ExitSummary },
}

/// Why a start was abandoned before spawning anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The desired port was busy and the fallback was refused.
    PortDeclined { desired: u16, proposed: u16 },
    /// Neither the desired port nor any port in the scan window was free.
    NoFreePort { desired: u16, window: u16 },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortDeclined { desired, proposed } => write!(
                f,
                "port {desired} is in use and the alternative port {proposed} was declined"
            ),
            Self::NoFreePort { desired, window } => write!(
                f,
                "port {desired} is in use and no free port was found in the next {window} ports"
            ),
        }
    }
}

/// Result of `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOutcome {
    /// Foreground worker ran to completion.
    Foreground {
        pid: Option<u32>,
        exit: ExitSummary,
    },
    /// Background worker spawned and its PID persisted.
    Background {
        process: ManagedProcess,
        readiness: Readiness,
    },
    /// A live worker is already recorded for this environment.
    AlreadyRunning { pid: u32 },
    /// Nothing was spawned.
    Aborted(AbortReason),
    /// Dry-run mode: the command line that would have been executed.
    DryRun { command_line: String },
}

/// Result of `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopOutcome {
    /// Termination confirmed and the PID file removed.
    Stopped { pid: u32, forced: bool },
    /// No PID file (or an unreadable one).
    NotRunning,
    /// The PID file named a dead process and was removed.
    StaleRemoved { pid: u32 },
}

/// Result of `restart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartOutcome {
    pub stopped: StopOutcome,
    pub started: StartOutcome,
}

/// Answer to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: ProcessState,
    pub running: bool,
    /// PID read from the PID file, live or not.
    pub pid: Option<u32>,
}

impl StatusReport {
    pub const fn stopped() -> Self {
        Self {
            state: ProcessState::Stopped,
            running: false,
            pid: None,
        }
    }

    pub const fn running(pid: u32) -> Self {
        Self {
            state: ProcessState::Running,
            running: true,
            pid: Some(pid),
        }
    }

    pub const fn stale(pid: u32) -> Self {
        Self {
            state: ProcessState::Stale,
            running: false,
            pid: Some(pid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_constructors_are_consistent() {
        assert!(StatusReport::running(42).running);
        assert_eq!(StatusReport::stale(42).state, ProcessState::Stale);
        assert_eq!(StatusReport::stopped().pid, None);
    }

    #[test]
    fn abort_reason_mentions_both_ports() {
        let reason = AbortReason::PortDeclined {
            desired: 8188,
            proposed: 8189,
        };
        let text = reason.to_string();
        assert!(text.contains("8188") && text.contains("8189"));
    }

    #[test]
    fn launch_mode_serializes_lowercase() {
        let json = serde_json::to_string(&LaunchMode::Background).unwrap();
        assert_eq!(json, "\"background\"");
    }
}
