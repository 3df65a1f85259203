//! Environment supervisor trait definition.
//!
//! This is the narrow surface the CLI (or any other front end) consumes.
//! Implementations handle all process lifecycle details internally.

use async_trait::async_trait;

use crate::config::EnvironmentConfig;
use crate::domain::{LaunchMode, RestartOutcome, StartOutcome, StatusReport, StopOutcome};
use crate::error::SupervisorError;

/// Lifecycle control for the single worker of an environment.
///
/// # Design Rules
///
/// - "Already running" / "not running" are outcomes, not errors
/// - Actions against one environment run to completion sequentially
/// - `status` never fails; unreadable state is reported as stopped
#[async_trait]
pub trait EnvironmentSupervisor: Send + Sync {
    /// Start the worker in the given mode.
    async fn start(
        &self,
        env: &EnvironmentConfig,
        mode: LaunchMode,
    ) -> Result<StartOutcome, SupervisorError>;

    /// Stop the recorded worker, if any.
    async fn stop(&self, env: &EnvironmentConfig) -> Result<StopOutcome, SupervisorError>;

    /// Stop, confirm termination, then start in the background.
    ///
    /// Must not start anything if the stop could not be confirmed.
    async fn restart(&self, env: &EnvironmentConfig) -> Result<RestartOutcome, SupervisorError>;

    /// Report whether the recorded worker is alive.
    async fn status(&self, env: &EnvironmentConfig) -> StatusReport;

    /// Remove the PID file if it names a dead process.
    ///
    /// Returns the pid that was cleared, or `None` when there was nothing
    /// stale to remove.
    async fn clear_stale(&self, env: &EnvironmentConfig) -> Result<Option<u32>, SupervisorError>;
}
