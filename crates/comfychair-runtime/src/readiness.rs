//! Readiness detection by scanning the worker log.
//!
//! The worker does not expose a health endpoint we can rely on, so
//! readiness means "the marker line has been written to the log".

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use comfychair_core::{
    DEFAULT_READY_MARKER, ExitSummary, Readiness, SupervisorError, SupervisorSettings,
};
use tokio::process::Child;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Polls a log file until a marker appears, the worker exits or time runs out.
#[derive(Debug, Clone)]
pub struct ReadinessWatcher {
    log_file: PathBuf,
    marker: String,
    timeout: Duration,
    interval: Duration,
}

impl ReadinessWatcher {
    pub fn new(log_file: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        let defaults = SupervisorSettings::default();
        Self {
            log_file: log_file.into(),
            marker: marker.into(),
            timeout: defaults.ready_timeout(),
            interval: defaults.poll_interval(),
        }
    }

    /// Watcher using the default marker.
    pub fn for_log(log_file: impl Into<PathBuf>) -> Self {
        Self::new(log_file, DEFAULT_READY_MARKER)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Wait for readiness.
    ///
    /// A timeout is not an error: it yields [`Readiness::NotConfirmed`].
    /// When `child` is given, an early exit yields [`Readiness::ExitedEarly`].
    pub async fn wait(&self, mut child: Option<&mut Child>) -> Result<Readiness, SupervisorError> {
        let started = Instant::now();

        loop {
            if self.marker_present()? {
                debug!(
                    log = %self.log_file.display(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Readiness marker found"
                );
                return Ok(Readiness::Ready);
            }

            if let Some(child) = child.as_deref_mut()
                && let Ok(Some(status)) = child.try_wait()
            {
                let exit = ExitSummary::from(status);
                warn!(%exit, "Worker exited before becoming ready");
                return Ok(Readiness::ExitedEarly { exit });
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Ok(Readiness::NotConfirmed { waited });
            }

            sleep(self.interval.min(self.timeout - waited)).await;
        }
    }

    fn marker_present(&self) -> Result<bool, SupervisorError> {
        log_contains(&self.log_file, &self.marker)
            .map_err(|e| SupervisorError::persistence(&self.log_file, e))
    }
}

/// Scan the whole log for `marker`. A missing log is "not yet".
fn log_contains(path: &Path, marker: &str) -> io::Result<bool> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).contains(marker)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fast(log: &Path) -> ReadinessWatcher {
        ReadinessWatcher::for_log(log)
            .timeout(Duration::from_millis(300))
            .interval(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn marker_already_present_is_ready() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("comfyui.log");
        fs::write(&log, "loading nodes\nStarting server\n").unwrap();

        assert_eq!(fast(&log).wait(None).await.unwrap(), Readiness::Ready);
    }

    #[tokio::test]
    async fn missing_log_times_out_softly() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("never-written.log");

        let readiness = fast(&log).wait(None).await.unwrap();
        assert!(matches!(
            readiness,
            Readiness::NotConfirmed { waited } if waited >= Duration::from_millis(300)
        ));
    }

    #[tokio::test]
    async fn marker_written_later_is_found() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("comfyui.log");
        fs::write(&log, "booting\n").unwrap();

        let writer_log = log.clone();
        let writer = tokio::spawn(async move {
            sleep(Duration::from_millis(60)).await;
            fs::write(&writer_log, "booting\nStarting server on 8188\n").unwrap();
        });

        let readiness = ReadinessWatcher::for_log(&log)
            .timeout(Duration::from_secs(5))
            .interval(Duration::from_millis(20))
            .wait(None)
            .await
            .unwrap();
        writer.await.unwrap();
        assert_eq!(readiness, Readiness::Ready);
    }

    #[tokio::test]
    async fn custom_marker_is_honoured() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("comfyui.log");
        fs::write(&log, "Starting server\n").unwrap();

        let readiness = ReadinessWatcher::new(&log, "To see the GUI go to")
            .timeout(Duration::from_millis(100))
            .interval(Duration::from_millis(20))
            .wait(None)
            .await
            .unwrap();
        assert!(matches!(readiness, Readiness::NotConfirmed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn early_exit_is_reported() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("comfyui.log");

        let mut child = tokio::process::Command::new("sh")
            .args(["-c", "exit 4"])
            .spawn()
            .unwrap();

        let readiness = ReadinessWatcher::for_log(&log)
            .timeout(Duration::from_secs(5))
            .interval(Duration::from_millis(20))
            .wait(Some(&mut child))
            .await
            .unwrap();
        assert_eq!(
            readiness,
            Readiness::ExitedEarly {
                exit: ExitSummary {
                    code: Some(4),
                    success: false
                }
            }
        );
    }
}
