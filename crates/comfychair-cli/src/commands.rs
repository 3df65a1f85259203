//! Main commands enum.
//!
//! This module defines the available commands for the CLI tool.

use clap::Subcommand;

/// Lifecycle commands for the selected environment's worker.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the worker attached to this terminal
    #[command(visible_alias = "start-fg")]
    Start,

    /// Start the worker detached, logging to its log file
    #[command(visible_aliases = ["start-bg", "bg"])]
    Background,

    /// Stop the running worker
    Stop,

    /// Stop the worker, then start it again in the background
    Restart,

    /// Show whether the worker is running
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured environments
    Envs {
        /// Print the environments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved config, PID and log paths
    Paths,
}
