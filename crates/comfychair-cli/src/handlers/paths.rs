//! Paths command handler.
//!
//! Displays all resolved paths for diagnostics and debugging.

use comfychair_core::EnvironmentsFile;

use crate::bootstrap::CliConfig;
use crate::error::CliError;

/// Execute the paths command.
///
/// Prints paths in `key = value` format. Works without a valid config file
/// so it can be used to find out where the config is expected.
pub fn execute(config: &CliConfig) -> Result<(), CliError> {
    println!("config = {}", config.config_path.display());
    println!("data_root = {}", config.data_root.display());

    let environments = match EnvironmentsFile::load(&config.config_path) {
        Ok(file) => file,
        Err(e) => {
            println!("environments = unavailable ({e})");
            return Ok(());
        }
    };

    let selected = config.environment.as_deref();
    for env in environments
        .environments
        .iter()
        .filter(|e| selected.is_none_or(|name| e.name == name))
    {
        println!(
            "{}.pid = {}",
            env.name,
            env.pid_file_path(&config.data_root).display()
        );
        println!(
            "{}.log = {}",
            env.name,
            env.log_file_path(&config.data_root).display()
        );
    }
    Ok(())
}
