//! Liveness probe trait definition.

/// Answers whether a process id currently denotes a live process owned by
/// the invoking user.
///
/// Implementations must return `false` for pid `0`, which is the sentinel
/// for "no identifier recorded".
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait LivenessProbe: Send + Sync {
    fn is_running(&self, pid: u32) -> bool;
}
