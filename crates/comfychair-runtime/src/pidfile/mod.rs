//! PID file management for tracking background workers.
//!
//! One file per environment holding a single decimal pid. The supervisor
//! treats an absent file as "not running" and a corrupt one as a warning.

mod io;

pub use io::{PidFileError, delete_pid, read_pid, write_pid};
