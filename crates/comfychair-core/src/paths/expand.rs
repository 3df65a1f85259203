//! `{HOME}` placeholder expansion for configured paths.

use std::path::{Path, PathBuf};

const HOME_PLACEHOLDER: &str = "{HOME}";
#[cfg(windows)]
const USERPROFILE_PLACEHOLDER: &str = "{USERPROFILE}";

/// Replace `{HOME}` (and `{USERPROFILE}` on Windows) with the user's home
/// directory.
///
/// Paths without placeholders are returned unchanged. If the home directory
/// cannot be determined the placeholder is left in place, which makes the
/// resulting path fail loudly at validation time instead of silently
/// pointing somewhere else.
pub fn expand_user_path(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if !raw.contains('{') {
        return path.to_path_buf();
    }

    let mut expanded = raw.to_string();
    if let Some(home) = dirs::home_dir() {
        expanded = expanded.replace(HOME_PLACEHOLDER, &home.to_string_lossy());
    }

    #[cfg(windows)]
    if let Ok(profile) = std::env::var("USERPROFILE")
        && !profile.is_empty()
    {
        expanded = expanded.replace(USERPROFILE_PLACEHOLDER, &profile);
    }

    PathBuf::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        let path = Path::new("/opt/comfy/main.py");
        assert_eq!(expand_user_path(path), path);
    }

    #[test]
    fn home_placeholder_is_replaced() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let expanded = expand_user_path(Path::new("{HOME}/ComfyUI"));
        assert_eq!(expanded, home.join("ComfyUI"));
    }
}
