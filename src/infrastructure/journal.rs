//! Write-ahead journal for site renames.
//!
//! A rename touches the site file, two links, the hosts file and the
//! index. The plan is written before the first step and updated after
//! each one, so an interrupted rename can be replayed. Every step is
//! idempotent.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Port, SiteDomain};
use crate::infrastructure::fs::write_atomic;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Failed to access rename journal {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Corrupt rename journal {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize rename journal: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStep {
    RemoveOldLink,
    MoveFile,
    CreateNewLink,
    RenderContent,
    UpdateRecord,
    UpdateHosts,
}

impl RenameStep {
    pub const ALL: [RenameStep; 6] = [
        RenameStep::RemoveOldLink,
        RenameStep::MoveFile,
        RenameStep::CreateNewLink,
        RenameStep::RenderContent,
        RenameStep::UpdateRecord,
        RenameStep::UpdateHosts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::RemoveOldLink => "Remove old link",
            Self::MoveFile => "Move site file",
            Self::CreateNewLink => "Create new link",
            Self::RenderContent => "Render configuration",
            Self::UpdateRecord => "Update registry",
            Self::UpdateHosts => "Update hosts alias",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    /// Position of the record in the index when the rename started.
    pub index: usize,
    /// Creation stamp of the record, used to find it again.
    pub created: u64,
    pub old_domain: SiteDomain,
    pub new_domain: SiteDomain,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub port: Port,
    pub host: Option<String>,
    pub ip: String,
    /// Whether the renamed site gets an enable link.
    pub activate: bool,
    #[serde(default)]
    pub completed: Vec<RenameStep>,
}

impl RenamePlan {
    pub fn pending_steps(&self) -> Vec<RenameStep> {
        RenameStep::ALL
            .into_iter()
            .filter(|s| !self.completed.contains(s))
            .collect()
    }

    pub fn mark_done(&mut self, step: RenameStep) {
        if !self.completed.contains(&step) {
            self.completed.push(step);
        }
    }

    pub fn old_site_name(&self) -> &str {
        file_name_or(&self.old_path, self.old_domain.primary())
    }

    pub fn new_site_name(&self) -> &str {
        file_name_or(&self.new_path, self.new_domain.primary())
    }
}

fn file_name_or<'a>(path: &'a Path, fallback: &'a str) -> &'a str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
}

pub struct RenameJournal {
    path: PathBuf,
}

impl RenameJournal {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<RenamePlan>, JournalError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let plan = toml::from_str(&content).map_err(|e| JournalError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(plan))
    }

    pub fn save(&self, plan: &RenamePlan) -> Result<(), JournalError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let content = toml::to_string(plan)?;
        write_atomic(&self.path, content.as_bytes()).map_err(|e| self.io_error(e))?;
        debug!(completed = plan.completed.len(), "rename journal saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), JournalError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: io::Error) -> JournalError {
        JournalError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plan() -> RenamePlan {
        RenamePlan {
            index: 0,
            created: 1_717_000_000_000,
            old_domain: SiteDomain::new("svc.test").unwrap(),
            new_domain: SiteDomain::new("svc2.test").unwrap(),
            old_path: PathBuf::from("/sites/svc.test"),
            new_path: PathBuf::from("/sites/svc2.test"),
            port: Port::new(8080).unwrap(),
            host: None,
            ip: "127.0.0.1".into(),
            activate: true,
            completed: Vec::new(),
        }
    }

    #[test]
    fn test_progress_survives_reload() {
        let dir = TempDir::new().unwrap();
        let journal = RenameJournal::new(dir.path().join("rename.journal"));
        assert!(journal.load().unwrap().is_none());

        let mut plan = plan();
        plan.mark_done(RenameStep::RemoveOldLink);
        plan.mark_done(RenameStep::MoveFile);
        plan.mark_done(RenameStep::MoveFile);
        journal.save(&plan).unwrap();

        let loaded = journal.load().unwrap().unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(loaded.pending_steps()[0], RenameStep::CreateNewLink);
        assert_eq!(loaded.pending_steps().len(), 4);

        journal.clear().unwrap();
        journal.clear().unwrap();
        assert!(journal.load().unwrap().is_none());
    }

    #[test]
    fn test_site_names() {
        let plan = plan();
        assert_eq!(plan.old_site_name(), "svc.test");
        assert_eq!(plan.new_site_name(), "svc2.test");
        assert_eq!(plan.pending_steps().len(), RenameStep::ALL.len());
    }
}
