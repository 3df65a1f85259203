//! Command handlers that delegate to the supervisor.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Select the environment
//!   2. Call the `EnvironmentSupervisor` port
//!   3. Format the outcome for the terminal
//!
//! Handlers should NOT touch PID files, signals or processes directly.

pub mod envs;
pub mod paths;
pub mod restart;
pub mod start;
pub mod status;
pub mod stop;
