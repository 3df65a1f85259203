//! Command and argument validation run before any process is created.
//!
//! Nothing here routes through a shell; the checks exist so that a bad
//! config entry fails loudly instead of launching something unexpected.

use std::path::Path;

use comfychair_core::ValidationError;
use comfychair_core::error::MAX_ARGUMENT_LEN;

/// Characters rejected in bare (non-absolute) command names.
const DANGEROUS_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', '\n', '\r',
];

/// Validate the executable of an invocation.
///
/// Absolute paths must point at an existing regular file that carries an
/// execute bit (on unix). Bare names are resolved through `PATH` by the OS,
/// so only their spelling is checked.
pub fn validate_command(command: &Path) -> Result<(), ValidationError> {
    let raw = command.to_string_lossy();
    if raw.is_empty() {
        return Err(ValidationError::EmptyCommand);
    }

    if command.is_absolute() {
        return validate_absolute(command);
    }

    if let Some(character) = raw.chars().find(|c| DANGEROUS_CHARS.contains(c)) {
        return Err(ValidationError::DangerousCharacter {
            command: raw.into_owned(),
            character,
        });
    }

    if raw.contains("..") {
        return Err(ValidationError::PathTraversal(raw.into_owned()));
    }

    Ok(())
}

fn validate_absolute(path: &Path) -> Result<(), ValidationError> {
    let Ok(metadata) = path.metadata() else {
        return Err(ValidationError::CommandNotFound(path.to_path_buf()));
    };

    if metadata.is_dir() {
        return Err(ValidationError::CommandIsDirectory(path.to_path_buf()));
    }
    if !metadata.is_file() {
        return Err(ValidationError::NotARegularFile(path.to_path_buf()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ValidationError::NotExecutable(path.to_path_buf()));
        }
    }

    Ok(())
}

/// Validate one argument. `index` is its zero-based position.
pub fn validate_argument(index: usize, arg: &str) -> Result<(), ValidationError> {
    if arg.contains('\0') {
        return Err(ValidationError::ArgumentContainsNul { index });
    }
    if arg.len() > MAX_ARGUMENT_LEN {
        return Err(ValidationError::ArgumentTooLong {
            index,
            len: arg.len(),
        });
    }
    Ok(())
}

/// Validate a whole invocation; the first failure wins.
pub fn validate_invocation<S: AsRef<str>>(
    command: &Path,
    args: &[S],
) -> Result<(), ValidationError> {
    validate_command(command)?;
    args.iter()
        .enumerate()
        .try_for_each(|(i, arg)| validate_argument(i, arg.as_ref()))
}
