//! Supervisor timing and limit settings.
//!
//! These are pure domain values with no infrastructure dependencies. All
//! durations are stored as milliseconds so they round-trip through JSON
//! unchanged; use the accessor methods to get a [`Duration`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port the worker listens on unless the environment overrides it.
pub const DEFAULT_PORT: u16 = 8188;

/// Flag used to pass the resolved port to the worker.
pub const DEFAULT_PORT_FLAG: &str = "--port";

/// Substring the worker prints once it has finished initializing.
pub const DEFAULT_READY_MARKER: &str = "Starting server";

/// PID file name used when an environment does not configure one.
pub const DEFAULT_PID_FILE_NAME: &str = "comfyui.pid";

/// Log file name used when an environment does not configure one.
pub const DEFAULT_LOG_FILE_NAME: &str = "comfyui.log";

/// Timing and limit knobs for the supervisor.
///
/// Every field has a default, so a config file may set only the values it
/// cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorSettings {
    /// Hard timeout for the readiness wait after a background start.
    pub ready_timeout_ms: u64,
    /// Tick interval for the readiness and stop-confirmation loops.
    pub poll_interval_ms: u64,
    /// How long to wait for a graceful exit before forcing termination.
    pub stop_timeout_ms: u64,
    /// How long to wait for exit after a forced kill.
    pub kill_grace_ms: u64,
    /// Pause between a confirmed stop and the following start on restart.
    pub restart_grace_ms: u64,
    /// Maximum age of a cached liveness answer.
    pub cache_ttl_ms: u64,
    /// Entries idle longer than this are evicted by the sweep.
    pub cache_max_idle_ms: u64,
    /// Minimum time between two sweeps.
    pub cache_sweep_interval_ms: u64,
    /// Number of ports above the desired one to scan on conflict.
    pub port_scan_window: u16,
    /// Log the command instead of spawning it.
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 60_000,
            poll_interval_ms: 500,
            stop_timeout_ms: 60_000,
            kill_grace_ms: 2_000,
            restart_grace_ms: 3_000,
            cache_ttl_ms: 5_000,
            cache_max_idle_ms: 30_000,
            cache_sweep_interval_ms: 300_000,
            port_scan_window: 1_000,
            dry_run: false,
        }
    }
}

impl SupervisorSettings {
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    #[must_use]
    pub const fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }

    #[must_use]
    pub const fn restart_grace(&self) -> Duration {
        Duration::from_millis(self.restart_grace_ms)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    #[must_use]
    pub const fn cache_max_idle(&self) -> Duration {
        Duration::from_millis(self.cache_max_idle_ms)
    }

    #[must_use]
    pub const fn cache_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cache_sweep_interval_ms)
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = SupervisorSettings::default();
        assert_eq!(settings.ready_timeout(), Duration::from_secs(60));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(5));
        assert_eq!(settings.cache_max_idle(), Duration::from_secs(30));
        assert_eq!(settings.cache_sweep_interval(), Duration::from_secs(300));
        assert_eq!(settings.port_scan_window, 1000);
        assert!(!settings.dry_run);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let settings: SupervisorSettings =
            serde_json::from_str(r#"{ "stop_timeout_ms": 1500 }"#).unwrap();
        assert_eq!(settings.stop_timeout(), Duration::from_millis(1500));
        assert_eq!(settings.poll_interval(), Duration::from_millis(500));
    }
}
