//! Process termination port.

use async_trait::async_trait;
use std::io;

/// Delivers termination requests to a process identified only by its pid.
///
/// Both methods treat "no such process" as success: the goal is a dead
/// process, not a delivered signal.
#[async_trait]
pub trait ProcessTerminator: Send + Sync {
    /// Ask the process to exit. On platforms without a graceful signal this
    /// is allowed to terminate forcefully; return `true` in that case.
    async fn terminate(&self, pid: u32) -> io::Result<bool>;

    /// Kill the process unconditionally.
    async fn force_kill(&self, pid: u32) -> io::Result<()>;
}
