//! Platform-specific path detection and resolution.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV_VAR: &str = "COMFYCHAIR_DATA_DIR";

/// Environment variable overriding the environments config file.
pub const CONFIG_ENV_VAR: &str = "COMFYCHAIR_CONFIG";

/// File name of the environments config inside the data root.
pub const CONFIG_FILE_NAME: &str = "environments.json";

const APP_DIR_NAME: &str = "comfy-chair";

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `COMFYCHAIR_DATA_DIR` environment variable (highest priority)
/// 2. System data directory (e.g., `~/.local/share/comfy-chair`)
///
/// The system directory is created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    data_root_from(env::var_os(DATA_DIR_ENV_VAR))
}

fn data_root_from(override_dir: Option<OsString>) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let root = dirs::data_local_dir()
        .ok_or(PathError::NoDataDir)?
        .join(APP_DIR_NAME);

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Location of the environments config file.
///
/// `COMFYCHAIR_CONFIG` wins; otherwise `<data_root>/environments.json`.
pub fn default_config_path() -> Result<PathBuf, PathError> {
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(data_root()?.join(CONFIG_FILE_NAME))
}
