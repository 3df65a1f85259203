//! Status command handler.
//!
//! Reports whether the worker is alive and offers to remove a PID file that
//! points at a dead process.

use comfychair_core::ProcessState;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::utils::input::prompt_confirmation;

/// Execute `status`.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<(), CliError> {
    let env = ctx.environment()?;
    let report = ctx.supervisor().status(env).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match (report.state, report.pid) {
        (ProcessState::Running, Some(pid)) => {
            println!("'{}' is running (PID {pid}).", env.name);
        }
        (ProcessState::Stale, Some(pid)) => {
            println!(
                "'{}' is not running, but its PID file still names PID {pid}.",
                env.name
            );
            let remove = ctx.config.assume_yes
                || prompt_confirmation("Remove the stale PID file?")?;
            if remove && let Some(pid) = ctx.supervisor().clear_stale(env).await? {
                println!("Removed stale PID file (PID {pid}).");
            }
        }
        _ => println!("'{}' is not running.", env.name),
    }
    Ok(())
}
