//! Liveness via `tasklist` process enumeration.

#[cfg(windows)]
use comfychair_core::LivenessProbe;

/// Probe that asks `tasklist` for the pid.
///
/// A failed `tasklist` run counts as "not running".
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsProbe;

#[cfg(windows)]
impl LivenessProbe for WindowsProbe {
    fn is_running(&self, pid: u32) -> bool {
        use std::process::{Command, Stdio};

        if pid == 0 {
            return false;
        }

        let output = Command::new("tasklist")
            .args(["/FI", &format!("PID eq {pid}"), "/NH", "/FO", "CSV"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        let Ok(output) = output else {
            return false;
        };
        if !output.status.success() {
            return false;
        }

        tasklist_lists_pid(&String::from_utf8_lossy(&output.stdout), pid)
    }
}

/// Whether CSV output from `tasklist /NH /FO CSV` contains a row for `pid`.
///
/// Matches the PID column exactly, so pid 123 is not found in a row for
/// 1234. Every field is quoted, so rows are split on `","` and an image name
/// containing a comma stays in one piece. The "no tasks" info line is not
/// quoted and never matches.
pub fn tasklist_lists_pid(output: &str, pid: u32) -> bool {
    let wanted = pid.to_string();
    output.lines().any(|line| {
        line.trim()
            .strip_prefix('"')
            .and_then(|row| row.split("\",\"").nth(1))
            .is_some_and(|field| field.trim_end_matches('"') == wanted)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\"python.exe\",\"1234\",\"Console\",\"1\",\"120,512 K\"\r\n\
                          \"svchost.exe\",\"123\",\"Services\",\"0\",\"8,204 K\"\r\n";

    #[test]
    fn exact_pid_matches() {
        assert!(tasklist_lists_pid(SAMPLE, 1234));
        assert!(tasklist_lists_pid(SAMPLE, 123));
    }

    #[test]
    fn prefix_of_pid_does_not_match() {
        let long_only = SAMPLE.lines().next().unwrap();
        let short_only = SAMPLE.lines().nth(1).unwrap();
        assert!(!tasklist_lists_pid(long_only, 123));
        assert!(!tasklist_lists_pid(short_only, 1234));
        assert!(!tasklist_lists_pid(SAMPLE, 12));
        assert!(!tasklist_lists_pid(SAMPLE, 12345));
    }

    #[test]
    fn comma_in_image_name_keeps_pid_column() {
        let output = "\"comfy,ui.exe\",\"4321\",\"Console\",\"1\",\"64 K\"\r\n";
        assert!(tasklist_lists_pid(output, 4321));
        assert!(!tasklist_lists_pid(output, 1));
    }

    #[test]
    fn no_tasks_message_does_not_match() {
        let output = "INFO: No tasks are running which match the specified criteria.\r\n";
        assert!(!tasklist_lists_pid(output, 1234));
        assert!(!tasklist_lists_pid("", 1234));
    }
}
