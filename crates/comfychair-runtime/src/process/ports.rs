//! Network port selection for the worker.

use std::net::{Ipv4Addr, TcpListener};

use comfychair_core::PortConfirmer;
use tracing::debug;

/// Check if a port is available by attempting to bind to it.
///
/// Both loopback and the wildcard address must be free: the worker may
/// listen on either. The listeners are dropped immediately, releasing the
/// port.
pub fn is_port_available(port: u16) -> bool {
    [Ipv4Addr::LOCALHOST, Ipv4Addr::UNSPECIFIED]
        .into_iter()
        .all(|addr| TcpListener::bind((addr, port)).is_ok_and(|l| l.local_addr().is_ok()))
}

/// First free port in `start..start + window`, if any.
pub fn find_available_port(start: u16, window: u16) -> Option<u16> {
    (0..window)
        .map_while(|offset| start.checked_add(offset))
        .find(|&port| is_port_available(port))
}

/// What to do about the desired port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDecision {
    /// Launch on this port.
    Use(u16),
    /// An alternative was found but refused.
    Declined { desired: u16, proposed: u16 },
    /// Nothing free in the scan window.
    Exhausted { desired: u16, window: u16 },
}

/// Resolve the port to launch on.
///
/// Uses `desired` when free. Otherwise scans upward from `desired + 1`
/// through `window` ports and asks `confirmer` about the first free one.
pub fn resolve_port(desired: u16, window: u16, confirmer: &dyn PortConfirmer) -> PortDecision {
    if is_port_available(desired) {
        return PortDecision::Use(desired);
    }

    let proposed = desired
        .checked_add(1)
        .and_then(|start| find_available_port(start, window));
    let Some(proposed) = proposed else {
        debug!(desired, window, "No free port in scan window");
        return PortDecision::Exhausted { desired, window };
    };

    debug!(desired, proposed, "Desired port busy, proposing fallback");
    if confirmer.confirm_fallback(desired, proposed) {
        PortDecision::Use(proposed)
    } else {
        PortDecision::Declined { desired, proposed }
    }
}
