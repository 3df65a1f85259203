//! Core domain types and port definitions for comfy-chair.
//!
//! This crate holds everything the supervisor needs to *describe* a worker
//! process without touching the operating system: environment configuration,
//! lifecycle outcomes, the error taxonomy, and the trait seams that the
//! runtime crate implements.
//!
//! # Design
//!
//! - No process spawning, signalling or socket I/O lives here
//! - Platform-specific behaviour is expressed as traits in [`ports`]
//! - Adapters (CLI) map [`SupervisorError`] onto their own error types

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod error;
pub mod paths;
pub mod ports;
pub mod settings;

pub use config::{EnvironmentConfig, EnvironmentsFile};
pub use domain::{
    AbortReason, ExitSummary, LaunchMode, ManagedProcess, ProcessState, Readiness,
    RestartOutcome, StartOutcome, StatusReport, StopOutcome,
};
pub use error::{SupervisorError, ValidationError};
pub use paths::{PathError, data_root, default_config_path, expand_user_path};
pub use ports::{
    AcceptFallback, EnvironmentSupervisor, LivenessProbe, PortConfirmer, ProcessTerminator,
};
pub use settings::{
    DEFAULT_LOG_FILE_NAME, DEFAULT_PID_FILE_NAME, DEFAULT_PORT, DEFAULT_PORT_FLAG,
    DEFAULT_READY_MARKER, SupervisorSettings,
};
