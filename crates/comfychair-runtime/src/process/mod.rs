//! Process-level helpers: network port selection and termination.

mod ports;
mod shutdown;

pub use ports::{PortDecision, find_available_port, is_port_available, resolve_port};
pub use shutdown::SignalTerminator;
