//! Port definitions (trait abstractions) for OS-facing collaborators.
//!
//! Ports define the interfaces that the supervisor expects from
//! infrastructure. They contain no implementation details.
//!
//! # Design Rules
//!
//! - Platform branching happens once, when an implementation is chosen
//! - Sync ports are mockable via the `test-utils` feature
//! - The supervisor port expresses intent (start/stop), not mechanics

pub mod confirm;
pub mod liveness;
pub mod supervisor;
pub mod terminator;

pub use confirm::{AcceptFallback, PortConfirmer};
pub use liveness::LivenessProbe;
pub use supervisor::EnvironmentSupervisor;
pub use terminator::ProcessTerminator;

#[cfg(any(test, feature = "test-utils"))]
pub use confirm::MockPortConfirmer;
#[cfg(any(test, feature = "test-utils"))]
pub use liveness::MockLivenessProbe;
