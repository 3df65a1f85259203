//! Confirmation port for falling back to an alternative network port.

/// Asks whoever drives the supervisor whether an alternative port may be
/// used when the desired one is taken.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait PortConfirmer: Send + Sync {
    /// Return `true` to start the worker on `proposed` instead of `desired`.
    fn confirm_fallback(&self, desired: u16, proposed: u16) -> bool;
}

/// Confirmer that accepts every fallback without asking.
///
/// Used for non-interactive runs (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptFallback;

impl PortConfirmer for AcceptFallback {
    fn confirm_fallback(&self, _desired: u16, _proposed: u16) -> bool {
        true
    }
}
