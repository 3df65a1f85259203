//! Liveness via the null signal.

use comfychair_core::LivenessProbe;
use nix::sys::signal;
use nix::unistd::Pid;

/// Probe using `kill(pid, 0)`.
///
/// Success means the process exists and we may signal it. `ESRCH` and
/// `EPERM` both count as "not ours": a pid owned by another user is not a
/// worker this tool started.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixProbe;

impl LivenessProbe for PosixProbe {
    fn is_running(&self, pid: u32) -> bool {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        if raw <= 0 {
            return false;
        }

        signal::kill(Pid::from_raw(raw), None).is_ok() && !is_zombie(pid)
    }
}

/// An exited but unreaped child still answers the null signal.
#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };
    // The command name may itself contain ')', so split on the last one.
    let Some(idx) = stat.rfind(')') else {
        return false;
    };
    stat[idx + 1..].trim_start().starts_with('Z')
}

#[cfg(not(target_os = "linux"))]
const fn is_zombie(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_running() {
        assert!(PosixProbe.is_running(std::process::id()));
    }

    #[test]
    fn zero_and_out_of_range_pids_are_not_running() {
        assert!(!PosixProbe.is_running(0));
        assert!(!PosixProbe.is_running(u32::MAX));
    }

    #[test]
    fn reaped_child_is_not_running() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(!PosixProbe.is_running(pid));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unreaped_child_is_not_running() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(!PosixProbe.is_running(pid));
        child.wait().unwrap();
    }
}
