//! Lifecycle orchestration for one worker per environment.
//!
//! The supervisor composes the validator, launcher, PID store, status cache
//! and terminator into start/stop/restart/status. It owns no global state:
//! the cache is injected, and the only thing it keeps between calls is the
//! `Child` handle of each worker it spawned itself.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use comfychair_core::{
    AbortReason, EnvironmentConfig, EnvironmentSupervisor, LaunchMode, ManagedProcess,
    PortConfirmer, ProcessTerminator, Readiness, RestartOutcome, StartOutcome, StatusReport,
    StopOutcome, SupervisorError, SupervisorSettings,
};
use tokio::process::Child;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cache::StatusCache;
use crate::launcher::{LaunchRequest, Launched, launch, preflight};
use crate::pidfile::{delete_pid, read_pid, write_pid};
use crate::process::{PortDecision, SignalTerminator, resolve_port};
use crate::readiness::ReadinessWatcher;

/// Default [`EnvironmentSupervisor`] implementation.
pub struct Supervisor {
    settings: SupervisorSettings,
    data_root: PathBuf,
    cache: Arc<StatusCache>,
    confirmer: Arc<dyn PortConfirmer>,
    terminator: Arc<dyn ProcessTerminator>,
    /// Workers spawned by this supervisor, keyed by environment name.
    children: Mutex<HashMap<String, Child>>,
}

impl Supervisor {
    /// Create a supervisor that terminates workers with OS signals.
    ///
    /// `data_root` holds PID and log files for environments without a
    /// working directory.
    pub fn new(
        settings: SupervisorSettings,
        data_root: impl Into<PathBuf>,
        cache: Arc<StatusCache>,
        confirmer: Arc<dyn PortConfirmer>,
    ) -> Self {
        Self {
            settings,
            data_root: data_root.into(),
            cache,
            confirmer,
            terminator: Arc::new(SignalTerminator),
            children: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the terminator.
    #[must_use]
    pub fn with_terminator(mut self, terminator: Arc<dyn ProcessTerminator>) -> Self {
        self.terminator = terminator;
        self
    }

    pub const fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Pid recorded for `env`. Unreadable or corrupt files are logged and
    /// treated as absent.
    fn recorded_pid(env: &EnvironmentConfig, pid_path: &Path) -> Option<u32> {
        match read_pid(pid_path) {
            Ok(pid) => pid,
            Err(e) => {
                warn!(environment = %env.name, error = %e, "Ignoring unusable PID file");
                None
            }
        }
    }

    /// Reap the held child for `env` if it is `pid` and has exited.
    ///
    /// Returns `true` when the exit was observed.
    async fn reap_held(&self, env_name: &str, pid: u32) -> bool {
        let mut children = self.children.lock().await;
        let Some(child) = children.get_mut(env_name) else {
            return false;
        };
        if child.id() != Some(pid) {
            return false;
        }

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(environment = env_name, pid, %status, "Reaped worker");
                children.remove(env_name);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(environment = env_name, pid, error = %e, "Cannot poll held worker");
                false
            }
        }
    }

    async fn forget_child(&self, env_name: &str) {
        self.children.lock().await.remove(env_name);
    }

    /// Delete the PID file of a dead worker and drop every trace of it.
    async fn clear_dead(
        &self,
        env: &EnvironmentConfig,
        pid_path: &Path,
        pid: u32,
    ) -> Result<(), SupervisorError> {
        delete_pid(pid_path).map_err(|e| SupervisorError::persistence(pid_path, e))?;
        self.cache.invalidate(pid);
        self.forget_child(&env.name).await;
        info!(environment = %env.name, pid, "Removed stale PID file");
        Ok(())
    }

    async fn is_alive(&self, env_name: &str, pid: u32) -> bool {
        if self.reap_held(env_name, pid).await {
            self.cache.record(pid, false);
            return false;
        }
        self.cache.is_running(pid)
    }

    /// Poll until `pid` is gone or `timeout` elapses.
    async fn wait_for_exit(&self, env_name: &str, pid: u32, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.reap_held(env_name, pid).await || !self.cache.refresh(pid) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            sleep(self.settings.poll_interval().min(deadline - now)).await;
        }
    }

    fn build_request(&self, env: &EnvironmentConfig, mode: LaunchMode) -> LaunchRequest {
        LaunchRequest {
            executable: env.executable_path(),
            args: env.args.clone(),
            work_dir: env.working_dir_path(),
            log_file: mode
                .is_background()
                .then(|| env.log_file_path(&self.data_root)),
            mode,
        }
    }

    async fn start_background(
        &self,
        env: &EnvironmentConfig,
        request: LaunchRequest,
        port: u16,
        pid_path: &Path,
    ) -> Result<StartOutcome, SupervisorError> {
        let log_path = env.log_file_path(&self.data_root);

        // Old markers must not satisfy the readiness scan
        if let Err(e) = std::fs::remove_file(&log_path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(log = %log_path.display(), error = %e, "Cannot remove previous log");
        }

        let Launched::Background { mut child, pid } = launch(&request).await? else {
            return Err(SupervisorError::State(
                "background launch returned a foreground result".to_string(),
            ));
        };

        if let Err(e) = write_pid(pid_path, pid) {
            warn!(
                environment = %env.name,
                pid,
                error = %e,
                "Worker started but PID file was not written"
            );
        }
        self.cache.record(pid, true);

        let process = ManagedProcess {
            pid,
            environment: env.name.clone(),
            executable: request.executable.clone(),
            working_dir: request.work_dir.clone(),
            log_file: Some(log_path.clone()),
            mode: LaunchMode::Background,
            port,
            started_at: Utc::now(),
        };

        let watch_started = Instant::now();
        let readiness = match ReadinessWatcher::new(&log_path, env.ready_marker())
            .timeout(self.settings.ready_timeout())
            .interval(self.settings.poll_interval())
            .wait(Some(&mut child))
            .await
        {
            Ok(readiness) => readiness,
            Err(e) => {
                warn!(environment = %env.name, error = %e, "Cannot scan worker log");
                Readiness::NotConfirmed {
                    waited: watch_started.elapsed(),
                }
            }
        };

        match readiness {
            Readiness::ExitedEarly { exit } => {
                warn!(environment = %env.name, pid, %exit, "Worker exited during startup");
                if let Err(e) = delete_pid(pid_path) {
                    warn!(error = %e, "Cannot remove PID file of exited worker");
                }
                self.cache.invalidate(pid);
            }
            Readiness::Ready => {
                info!(environment = %env.name, pid, port, "Worker is ready");
                self.children.lock().await.insert(env.name.clone(), child);
            }
            Readiness::NotConfirmed { waited } => {
                warn!(
                    environment = %env.name,
                    pid,
                    waited_ms = waited.as_millis(),
                    "Worker started but readiness was not confirmed"
                );
                self.children.lock().await.insert(env.name.clone(), child);
            }
        }

        Ok(StartOutcome::Background { process, readiness })
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("settings", &self.settings)
            .field("data_root", &self.data_root)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EnvironmentSupervisor for Supervisor {
    async fn start(
        &self,
        env: &EnvironmentConfig,
        mode: LaunchMode,
    ) -> Result<StartOutcome, SupervisorError> {
        let pid_path = env.pid_file_path(&self.data_root);

        if let Some(pid) = Self::recorded_pid(env, &pid_path) {
            if self.is_alive(&env.name, pid).await {
                info!(environment = %env.name, pid, "Worker already running");
                return Ok(StartOutcome::AlreadyRunning { pid });
            }
            if let Err(e) = self.clear_dead(env, &pid_path, pid).await {
                warn!(environment = %env.name, error = %e, "Stale PID file cleanup failed");
            }
        }

        let mut request = self.build_request(env, mode);
        preflight(&request)?;

        let port = match resolve_port(
            env.port,
            self.settings.port_scan_window,
            self.confirmer.as_ref(),
        ) {
            PortDecision::Use(port) => port,
            PortDecision::Declined { desired, proposed } => {
                info!(environment = %env.name, desired, proposed, "Port fallback declined");
                return Ok(StartOutcome::Aborted(AbortReason::PortDeclined {
                    desired,
                    proposed,
                }));
            }
            PortDecision::Exhausted { desired, window } => {
                warn!(environment = %env.name, desired, window, "No free port");
                return Ok(StartOutcome::Aborted(AbortReason::NoFreePort {
                    desired,
                    window,
                }));
            }
        };

        if let Some(flag) = env.port_flag.as_deref().filter(|f| !f.is_empty()) {
            request.args.push(flag.to_string());
            request.args.push(port.to_string());
        }

        if self.settings.dry_run {
            let command_line = request.command_line();
            info!(environment = %env.name, command = %command_line, "Dry run, not starting worker");
            return Ok(StartOutcome::DryRun { command_line });
        }

        match mode {
            LaunchMode::Foreground => match launch(&request).await? {
                Launched::Foreground { pid, exit } => Ok(StartOutcome::Foreground {
                    pid,
                    exit: exit.into(),
                }),
                Launched::Background { .. } => Err(SupervisorError::State(
                    "foreground launch returned a background result".to_string(),
                )),
            },
            LaunchMode::Background => self.start_background(env, request, port, &pid_path).await,
        }
    }

    async fn stop(&self, env: &EnvironmentConfig) -> Result<StopOutcome, SupervisorError> {
        let pid_path = env.pid_file_path(&self.data_root);
        let Some(pid) = Self::recorded_pid(env, &pid_path) else {
            debug!(environment = %env.name, "No PID file, nothing to stop");
            return Ok(StopOutcome::NotRunning);
        };

        if !self.is_alive(&env.name, pid).await {
            self.clear_dead(env, &pid_path, pid).await?;
            return Ok(StopOutcome::StaleRemoved { pid });
        }

        info!(environment = %env.name, pid, "Stopping worker");
        let mut forced = self.terminator.terminate(pid).await.map_err(|e| {
            SupervisorError::State(format!("cannot signal worker {pid}: {e}"))
        })?;

        let mut confirmed = self
            .wait_for_exit(&env.name, pid, self.settings.stop_timeout())
            .await;

        if !confirmed {
            warn!(environment = %env.name, pid, "Worker ignored termination, killing it");
            self.terminator.force_kill(pid).await.map_err(|e| {
                SupervisorError::State(format!("cannot kill worker {pid}: {e}"))
            })?;
            forced = true;
            confirmed = self
                .wait_for_exit(&env.name, pid, self.settings.kill_grace())
                .await;
        }

        if !confirmed {
            return Err(SupervisorError::Timeout(format!(
                "worker {pid} of '{}' is still running; PID file kept at {}",
                env.name,
                pid_path.display()
            )));
        }

        delete_pid(&pid_path).map_err(|e| SupervisorError::persistence(&pid_path, e))?;
        self.cache.invalidate(pid);
        self.forget_child(&env.name).await;
        info!(environment = %env.name, pid, forced, "Worker stopped");
        Ok(StopOutcome::Stopped { pid, forced })
    }

    async fn restart(&self, env: &EnvironmentConfig) -> Result<RestartOutcome, SupervisorError> {
        let stopped = self.stop(env).await?;

        if matches!(stopped, StopOutcome::Stopped { .. }) {
            // Give the OS time to release the port
            sleep(self.settings.restart_grace()).await;
        }

        let started = self.start(env, LaunchMode::Background).await?;
        Ok(RestartOutcome { stopped, started })
    }

    async fn status(&self, env: &EnvironmentConfig) -> StatusReport {
        let pid_path = env.pid_file_path(&self.data_root);
        let Some(pid) = Self::recorded_pid(env, &pid_path) else {
            return StatusReport::stopped();
        };

        if self.is_alive(&env.name, pid).await {
            StatusReport::running(pid)
        } else {
            StatusReport::stale(pid)
        }
    }

    async fn clear_stale(&self, env: &EnvironmentConfig) -> Result<Option<u32>, SupervisorError> {
        let pid_path = env.pid_file_path(&self.data_root);
        let Some(pid) = read_pid(&pid_path)? else {
            return Ok(None);
        };

        let dead = self.reap_held(&env.name, pid).await || !self.cache.refresh(pid);
        if !dead {
            return Ok(None);
        }

        self.clear_dead(env, &pid_path, pid).await?;
        Ok(Some(pid))
    }
}
