//! Environment configuration.
//!
//! An environment is one named installation of the worker: which executable
//! to run, with which arguments, from which directory, and where its PID and
//! log files live. Environments are loaded from a JSON file together with
//! the supervisor's [`SupervisorSettings`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SupervisorError;
use crate::paths::expand_user_path;
use crate::settings::{
    DEFAULT_LOG_FILE_NAME, DEFAULT_PID_FILE_NAME, DEFAULT_PORT, DEFAULT_PORT_FLAG,
    DEFAULT_READY_MARKER, SupervisorSettings,
};

const fn default_port() -> u16 {
    DEFAULT_PORT
}

#[allow(clippy::unnecessary_wraps)]
fn default_port_flag() -> Option<String> {
    Some(DEFAULT_PORT_FLAG.to_string())
}

/// Definition of a single supervised environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Unique environment name (e.g. "lounge").
    pub name: String,
    /// Interpreter or binary to launch.
    pub executable: PathBuf,
    /// Arguments passed before the port flag.
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the worker runs in. Must already exist.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Desired listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Flag used to hand the port to the worker; `null` disables it.
    #[serde(default = "default_port_flag")]
    pub port_flag: Option<String>,
    /// Log substring signalling readiness.
    #[serde(default)]
    pub ready_marker: Option<String>,
    /// Selected when no environment is requested explicitly.
    #[serde(default)]
    pub is_default: bool,
}

impl EnvironmentConfig {
    /// Minimal environment with defaults for everything but name and executable.
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            args: Vec::new(),
            working_dir: None,
            pid_file: None,
            log_file: None,
            port: DEFAULT_PORT,
            port_flag: default_port_flag(),
            ready_marker: None,
            is_default: false,
        }
    }

    /// Executable with `{HOME}` placeholders expanded.
    pub fn executable_path(&self) -> PathBuf {
        expand_user_path(&self.executable)
    }

    /// Working directory with `{HOME}` placeholders expanded.
    pub fn working_dir_path(&self) -> Option<PathBuf> {
        self.working_dir.as_deref().map(expand_user_path)
    }

    /// Resolved PID file location.
    ///
    /// Explicit path, else `<working_dir>/comfyui.pid`, else
    /// `<data_root>/<name>.pid`.
    pub fn pid_file_path(&self, data_root: &Path) -> PathBuf {
        self.resolve_file(self.pid_file.as_deref(), DEFAULT_PID_FILE_NAME, "pid", data_root)
    }

    /// Resolved log file location, following the same rules as the PID file.
    pub fn log_file_path(&self, data_root: &Path) -> PathBuf {
        self.resolve_file(self.log_file.as_deref(), DEFAULT_LOG_FILE_NAME, "log", data_root)
    }

    /// Readiness marker, falling back to the default.
    pub fn ready_marker(&self) -> &str {
        self.ready_marker.as_deref().unwrap_or(DEFAULT_READY_MARKER)
    }

    fn resolve_file(
        &self,
        explicit: Option<&Path>,
        default_name: &str,
        extension: &str,
        data_root: &Path,
    ) -> PathBuf {
        if let Some(path) = explicit {
            return expand_user_path(path);
        }
        match self.working_dir_path() {
            Some(dir) => dir.join(default_name),
            None => data_root.join(format!("{}.{extension}", self.name)),
        }
    }
}

/// Contents of the environments config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentsFile {
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
    #[serde(default)]
    pub settings: SupervisorSettings,
}

impl EnvironmentsFile {
    /// Load and parse the config file.
    ///
    /// A missing file is a configuration error: the supervisor has nothing
    /// to run without at least one environment.
    pub fn load(path: &Path) -> Result<Self, SupervisorError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SupervisorError::configuration(format!(
                "cannot read environments file {}: {e}",
                path.display()
            ))
        })?;
        let file = Self::parse(&raw).map_err(|e| {
            SupervisorError::configuration(format!("{}: {e}", path.display()))
        })?;
        debug!(
            path = %path.display(),
            environments = file.environments.len(),
            "Loaded environments file"
        );
        Ok(file)
    }

    /// Parse config JSON and check that environment names are unique.
    pub fn parse(raw: &str) -> Result<Self, SupervisorError> {
        let file: Self = serde_json::from_str(raw)
            .map_err(|e| SupervisorError::configuration(format!("invalid JSON: {e}")))?;

        for (i, env) in file.environments.iter().enumerate() {
            if env.name.trim().is_empty() {
                return Err(SupervisorError::configuration(format!(
                    "environment #{} has an empty name",
                    i + 1
                )));
            }
            if file.environments[..i].iter().any(|e| e.name == env.name) {
                return Err(SupervisorError::configuration(format!(
                    "duplicate environment name '{}'",
                    env.name
                )));
            }
        }
        Ok(file)
    }

    /// Look up an environment by exact name.
    pub fn find(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Pick the environment to act on.
    ///
    /// Order: the requested name, then the entry marked `is_default`, then
    /// the only entry if there is exactly one.
    pub fn select(&self, requested: Option<&str>) -> Result<&EnvironmentConfig, SupervisorError> {
        if let Some(name) = requested.filter(|n| !n.is_empty()) {
            return self.find(name).ok_or_else(|| {
                SupervisorError::configuration(format!(
                    "unknown environment '{name}' (available: {})",
                    self.names().join(", ")
                ))
            });
        }

        if let Some(env) = self.environments.iter().find(|e| e.is_default) {
            return Ok(env);
        }

        match self.environments.as_slice() {
            [only] => Ok(only),
            [] => Err(SupervisorError::configuration(
                "no environments are configured",
            )),
            _ => Err(SupervisorError::configuration(
                "several environments are configured; choose one with --env or WORKING_COMFY_ENV",
            )),
        }
    }

    fn names(&self) -> Vec<&str> {
        self.environments.iter().map(|e| e.name.as_str()).collect()
    }
}
