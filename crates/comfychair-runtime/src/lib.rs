//! OS-facing implementations of the comfy-chair ports.
//!
//! Everything that spawns, signals, probes or touches files on behalf of the
//! supervisor lives here. The [`Supervisor`] composes the pieces into the
//! start/stop/restart/status lifecycle.

#![deny(unsafe_code)]

pub mod cache;
pub mod launcher;
pub mod liveness;
pub mod pidfile;
pub mod process;
pub mod readiness;
mod supervisor;
pub mod validate;

pub use cache::{CacheTimings, StatusCache};
pub use launcher::{LaunchError, LaunchRequest, Launched, launch, preflight};
pub use liveness::platform_probe;
pub use process::{
    PortDecision, SignalTerminator, find_available_port, is_port_available, resolve_port,
};
pub use readiness::ReadinessWatcher;
pub use supervisor::Supervisor;
pub use validate::{validate_argument, validate_command, validate_invocation};
