//! Narrow contract with the web server being managed.

mod system;

use thiserror::Error;

pub use system::{CommandSet, SystemServiceController};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No command configured for '{0}'")]
    NotConfigured(&'static str),

    #[error("Failed to run {command}: {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },
}

/// Result of a configuration syntax check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub ok: bool,
    /// Combined stdout/stderr of the check, untouched.
    pub diagnostics: String,
}

pub trait ServiceController {
    /// Validate the live configuration tree without applying it
    fn check(&self) -> Result<CheckReport, ServiceError>;

    /// Ask the running service to load its configuration again
    fn reload(&self) -> Result<(), ServiceError>;

    /// Whether the service is running
    fn query_status(&self) -> Result<bool, ServiceError>;

    /// Listening sockets, as reported by the system
    fn list_listening_ports(&self) -> Result<String, ServiceError>;
}
