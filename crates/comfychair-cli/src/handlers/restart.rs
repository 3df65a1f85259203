//! Restart command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{start, stop};

/// Execute `restart`: stop, wait for the port to free up, start in the background.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let env = ctx.environment()?;
    println!("Restarting '{}'...", env.name);

    let outcome = ctx.supervisor().restart(env).await?;
    println!("{}", stop::describe(&env.name, outcome.stopped));
    println!("{}", start::describe(&env.name, &outcome.started)?);
    Ok(())
}
