//! Platform liveness probes.
//!
//! The implementation is chosen once, by [`platform_probe`]; callers only
//! ever see `dyn LivenessProbe`.

use std::sync::Arc;

use comfychair_core::LivenessProbe;

#[cfg(unix)]
mod posix;
mod windows;

#[cfg(unix)]
pub use posix::PosixProbe;
pub use windows::tasklist_lists_pid;
#[cfg(windows)]
pub use windows::WindowsProbe;

/// The liveness probe for the current platform.
#[cfg(unix)]
pub fn platform_probe() -> Arc<dyn LivenessProbe> {
    Arc::new(PosixProbe)
}

/// The liveness probe for the current platform.
#[cfg(windows)]
pub fn platform_probe() -> Arc<dyn LivenessProbe> {
    Arc::new(WindowsProbe)
}
