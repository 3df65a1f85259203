//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - Liveness probe for the current platform (via comfychair-runtime)
//! - Status cache with the configured timings
//! - Port confirmer (terminal prompt, or auto-accept with `--yes`)
//! - The supervisor itself
//!
//! Command handlers receive the composed [`CliContext`] and delegate work to
//! the supervisor through the `EnvironmentSupervisor` port.

use std::path::PathBuf;
use std::sync::Arc;

use comfychair_core::{
    AcceptFallback, EnvironmentConfig, EnvironmentSupervisor, EnvironmentsFile, PortConfirmer,
    data_root, default_config_path,
};
use comfychair_runtime::{CacheTimings, StatusCache, Supervisor, platform_probe};
use tracing::debug;

use crate::error::CliError;
use crate::parser::Cli;
use crate::utils::input::TerminalPortConfirmer;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Environments file to load.
    pub config_path: PathBuf,
    /// Home for PID/log files of environments without a working directory.
    pub data_root: PathBuf,
    /// Explicitly requested environment.
    pub environment: Option<String>,
    /// Accept prompts without asking.
    pub assume_yes: bool,
    pub dry_run: bool,
}

impl CliConfig {
    /// Resolve configuration from parsed arguments and the process environment.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let config_path = match &cli.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        Ok(Self {
            config_path,
            data_root: data_root()?,
            environment: cli.environment.clone().filter(|e| !e.is_empty()),
            assume_yes: cli.assume_yes,
            dry_run: cli.dry_run,
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Lifecycle control for environments.
    pub supervisor: Arc<dyn EnvironmentSupervisor>,
    /// Loaded environments and settings.
    pub environments: EnvironmentsFile,
    pub config: CliConfig,
}

impl CliContext {
    /// The environment selected by `--env`, the default flag, or uniqueness.
    pub fn environment(&self) -> Result<&EnvironmentConfig, CliError> {
        Ok(self.environments.select(self.config.environment.as_deref())?)
    }

    /// Access the supervisor.
    pub fn supervisor(&self) -> &Arc<dyn EnvironmentSupervisor> {
        &self.supervisor
    }
}

/// Bootstrap the CLI application.
///
/// This is the composition root. It:
/// 1. Loads the environments file and supervisor settings
/// 2. Creates the platform liveness probe and the status cache
/// 3. Chooses the port confirmer
/// 4. Assembles the supervisor
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let environments = EnvironmentsFile::load(&config.config_path)?;
    let settings = environments.settings.clone().with_dry_run(config.dry_run);

    let cache = Arc::new(StatusCache::with_timings(
        platform_probe(),
        CacheTimings::from(&settings),
    ));

    let confirmer: Arc<dyn PortConfirmer> = if config.assume_yes {
        Arc::new(AcceptFallback)
    } else {
        Arc::new(TerminalPortConfirmer)
    };

    debug!(
        config = %config.config_path.display(),
        data_root = %config.data_root.display(),
        environments = environments.environments.len(),
        "Bootstrapped supervisor"
    );

    let supervisor = Supervisor::new(settings, config.data_root.clone(), cache, confirmer);

    Ok(CliContext {
        supervisor: Arc::new(supervisor),
        environments,
        config,
    })
}
