//! Terminate workers by pid (no `Child` handle needed).
//!
//! The supervisor usually outlives nothing: a worker started by one CLI
//! invocation is stopped by another, so only the persisted pid is known.

use std::io;

use async_trait::async_trait;
use comfychair_core::ProcessTerminator;

/// Terminator backed by OS signals (unix) or `taskkill` (Windows).
///
/// # Platform behavior
/// - Unix: SIGTERM for graceful termination, SIGKILL to force
/// - Windows: no graceful signal exists, so both paths run `taskkill /F`
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTerminator;

#[async_trait]
impl ProcessTerminator for SignalTerminator {
    async fn terminate(&self, pid: u32) -> io::Result<bool> {
        #[cfg(unix)]
        {
            send_signal(pid, nix::sys::signal::Signal::SIGTERM).map(|()| false)
        }

        #[cfg(not(unix))]
        {
            taskkill(pid).await.map(|()| true)
        }
    }

    async fn force_kill(&self, pid: u32) -> io::Result<()> {
        #[cfg(unix)]
        {
            send_signal(pid, nix::sys::signal::Signal::SIGKILL)
        }

        #[cfg(not(unix))]
        {
            taskkill(pid).await
        }
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, sig: nix::sys::signal::Signal) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid)
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;

    match signal::kill(Pid::from_raw(raw), sig) {
        // Already gone
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
async fn taskkill(pid: u32) -> io::Result<()> {
    use std::process::Stdio;

    let output = tokio::process::Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .stdin(Stdio::null())
        .output()
        .await?;
    if output.status.success() {
        return Ok(());
    }

    // taskkill exits 128 when the process no longer exists
    if output.status.code() == Some(128) {
        return Ok(());
    }
    Err(io::Error::other(format!(
        "taskkill failed for pid {pid}: {}",
        String::from_utf8_lossy(&output.stderr).trim()
    )))
}
