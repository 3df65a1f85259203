//! Stop command handler.

use comfychair_core::StopOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute `stop`.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let env = ctx.environment()?;
    let outcome = ctx.supervisor().stop(env).await?;
    println!("{}", describe(&env.name, outcome));
    Ok(())
}

/// Render a stop outcome.
pub fn describe(env_name: &str, outcome: StopOutcome) -> String {
    match outcome {
        StopOutcome::Stopped { pid, forced: false } => {
            format!("'{env_name}' stopped (PID {pid}).")
        }
        StopOutcome::Stopped { pid, forced: true } => {
            format!("'{env_name}' was force-stopped (PID {pid}).")
        }
        StopOutcome::NotRunning => format!("'{env_name}' is not running."),
        StopOutcome::StaleRemoved { pid } => {
            format!("'{env_name}' was not running; removed stale PID file (PID {pid}).")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_stop_is_called_out() {
        let text = describe("nook", StopOutcome::Stopped { pid: 9, forced: true });
        assert!(text.contains("force-stopped"));
    }

    #[test]
    fn stale_removal_mentions_pid() {
        assert!(describe("nook", StopOutcome::StaleRemoved { pid: 77 }).contains("77"));
    }
}
