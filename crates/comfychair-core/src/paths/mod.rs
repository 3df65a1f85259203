//! Path utilities for comfy-chair data directories and configured locations.
//!
//! This module provides the canonical path resolution for:
//! - The data root (default home for PID/log files without a working dir)
//! - The environments config file
//! - `{HOME}` placeholder expansion in configured paths
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod error;
mod expand;
mod platform;

pub use error::PathError;
pub use expand::expand_user_path;
pub use platform::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, DATA_DIR_ENV_VAR, data_root, default_config_path,
};
