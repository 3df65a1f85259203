//! Envs command handler.

use comfychair_core::{EnvironmentConfig, EnvironmentsFile};

use crate::error::CliError;

/// Execute `envs`: list configured environments.
pub fn execute(environments: &EnvironmentsFile, json: bool) -> Result<(), CliError> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&environments.environments)?
        );
        return Ok(());
    }

    if environments.environments.is_empty() {
        println!("No environments configured.");
        return Ok(());
    }

    for env in &environments.environments {
        println!("{}", describe(env));
    }
    Ok(())
}

fn describe(env: &EnvironmentConfig) -> String {
    let marker = if env.is_default { " (default)" } else { "" };
    let dir = env
        .working_dir_path()
        .map(|d| format!(" in {}", d.display()))
        .unwrap_or_default();
    format!(
        "{}{marker}: {} on port {}{dir}",
        env.name,
        env.executable_path().display(),
        env.port
    )
}
