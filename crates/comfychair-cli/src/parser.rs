//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the comfy-chair worker supervisor.
///
/// Global options apply to every subcommand.
#[derive(Debug, Parser)]
#[command(name = "comfy-chair")]
#[command(about = "Start, stop and watch one ComfyUI worker per environment")]
#[command(version)]
pub struct Cli {
    /// Environment to act on (defaults to the entry marked `is_default`)
    #[arg(short = 'e', long = "env", env = "WORKING_COMFY_ENV", global = true)]
    pub environment: Option<String>,

    /// Path to the environments file
    #[arg(long, env = "COMFYCHAIR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Answer yes to every prompt (port fallback, stale PID removal)
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Print the command that would run instead of starting the worker.
    /// `restart` still stops a running worker first.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
