pub mod delete;
pub mod deploy;
pub mod diagnose;
pub mod edit;
pub mod list;
mod orchestrator;
pub mod toggle;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{DomainError, PortError, SiteTypeError};
use crate::infrastructure::activator::ActivatorError;
use crate::infrastructure::gate::GateOutcome;
use crate::infrastructure::journal::JournalError;
use crate::infrastructure::registry::RegistryError;

pub use orchestrator::{RegistryOrchestrator, SiteContext};

/// Outcome of a single step in a multi-step operation.
///
/// Used by application services to report partial success/failure
/// so the CLI layer can render feedback appropriately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success(String),
    Warning(String),
    Skipped(String),
}

impl StepOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(msg) => write!(f, "{}", msg),
            Self::Warning(msg) => write!(f, "Warning: {}", msg),
            Self::Skipped(msg) => write!(f, "Skipped: {}", msg),
        }
    }
}

pub type Steps = Vec<(String, StepOutcome)>;

/// Whether, and how, an operation's changes reached the running service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Syntax check passed and the service reloaded.
    Activated,
    /// Syntax check failed; the service was not reloaded.
    Rejected { diagnostics: String },
    /// Reloaded without a syntax check.
    Reloaded,
    /// The reload command failed.
    ReloadFailed { message: String },
}

impl Activation {
    /// True when the service picked up the change.
    pub fn took_effect(&self) -> bool {
        matches!(self, Self::Activated | Self::Reloaded)
    }
}

impl From<GateOutcome> for Activation {
    fn from(outcome: GateOutcome) -> Self {
        match outcome {
            GateOutcome::Activated => Self::Activated,
            GateOutcome::Rejected { diagnostics } => Self::Rejected { diagnostics },
            GateOutcome::ReloadFailed { message } => Self::ReloadFailed { message },
        }
    }
}

/// Input rejected before any side effect.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    SiteType(#[from] SiteTypeError),

    #[error("Invalid IP address: '{0}'")]
    Ip(String),

    #[error("Invalid backend host: '{0}'")]
    BackendHost(String),

    #[error("Domain '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("Invalid selection {selection}: {count} configuration(s) registered")]
    InvalidSelection { selection: usize, count: usize },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to {action} {path}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Activation(#[from] ActivatorError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("The rename of '{0}' is unfinished. Run 'sitectl resume' first.")]
    RenamePending(String),

    #[error("No registry record matches the rename of '{0}'; the index was changed externally")]
    RecordMoved(String),
}

impl OperationError {
    pub(crate) fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}
