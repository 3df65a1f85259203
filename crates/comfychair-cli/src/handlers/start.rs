//! Start command handler (foreground and background).

use comfychair_core::{LaunchMode, Readiness, StartOutcome};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute `start` / `background`.
pub async fn execute(ctx: &CliContext, mode: LaunchMode) -> Result<(), CliError> {
    let env = ctx.environment()?;
    if mode.is_background() {
        println!("Starting '{}' in the background...", env.name);
    } else {
        println!("Starting '{}' (press Ctrl+C to stop)...", env.name);
    }

    let outcome = ctx.supervisor().start(env, mode).await?;
    println!("{}", describe(&env.name, &outcome)?);
    Ok(())
}

/// Render a start outcome. An early worker exit is reported as an error.
pub fn describe(env_name: &str, outcome: &StartOutcome) -> Result<String, CliError> {
    let text = match outcome {
        StartOutcome::Foreground { exit, .. } if exit.success => {
            format!("'{env_name}' exited normally.")
        }
        StartOutcome::Foreground { exit, .. } => format!("'{env_name}' exited ({exit})."),
        StartOutcome::Background { process, readiness } => {
            let log = process
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match readiness {
                Readiness::Ready => format!(
                    "'{env_name}' is running (PID {}, port {}).\nLogs: {log}",
                    process.pid, process.port
                ),
                Readiness::NotConfirmed { waited } => format!(
                    "Warning: '{env_name}' started (PID {}, port {}) but did not report \
                     readiness within {}s; it might not be fully operational.\nLogs: {log}",
                    process.pid,
                    process.port,
                    waited.as_secs()
                ),
                Readiness::ExitedEarly { exit } => {
                    return Err(CliError::Process(format!(
                        "'{env_name}' exited during startup ({exit}); see {log}"
                    )));
                }
            }
        }
        StartOutcome::AlreadyRunning { pid } => {
            format!("'{env_name}' is already running (PID {pid}).")
        }
        StartOutcome::Aborted(reason) => format!("Start aborted: {reason}."),
        StartOutcome::DryRun { command_line } => format!("Dry run, would execute: {command_line}"),
    };
    Ok(text)
}
