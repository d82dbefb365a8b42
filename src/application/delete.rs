use std::fs;
use std::io;

use tracing::info;

use super::{Activation, OperationError, RegistryOrchestrator, StepOutcome, Steps};
use crate::domain::SiteRecord;

#[derive(Debug)]
pub struct DeleteResult {
    pub record: SiteRecord,
    pub steps: Steps,
    pub activation: Activation,
}

impl RegistryOrchestrator<'_> {
    /// Look up the record so the CLI can show a confirmation prompt
    /// before proceeding with `delete()`.
    pub fn preview(&self, index: usize) -> Result<SiteRecord, OperationError> {
        let registry = self.ctx.store.load()?;
        self.record_at(&registry, index)
    }

    /// Remove the site file, its enable link, its hosts alias and its
    /// record, then reload. Missing artifacts are not an error.
    pub fn delete(&self, index: usize) -> Result<DeleteResult, OperationError> {
        self.ensure_no_pending_rename()?;

        let mut registry = self.ctx.store.load()?;
        let record = self.record_at(&registry, index)?;
        let mut steps: Steps = Vec::new();

        let file_outcome = match fs::remove_file(&record.path) {
            Ok(()) => StepOutcome::Success(format!("Removed {}", record.path.display())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                StepOutcome::Skipped("Site file already absent.".into())
            }
            Err(e) => StepOutcome::Warning(format!(
                "Could not remove {}: {}",
                record.path.display(),
                e
            )),
        };
        steps.push(("Remove configuration".into(), file_outcome));

        let link_outcome = match self.ctx.activator.disable(record.site_name()) {
            Ok(true) => StepOutcome::Success("Enable link removed.".into()),
            Ok(false) => StepOutcome::Skipped("Site was not enabled.".into()),
            Err(e) => StepOutcome::Warning(e.to_string()),
        };
        steps.push(("Disable site".into(), link_outcome));

        let hosts_outcome = match self.ctx.hosts.remove(&record.domain) {
            Ok(0) => StepOutcome::Skipped("No hosts entry to remove.".into()),
            Ok(n) => StepOutcome::Success(format!("Removed {} hosts line(s).", n)),
            Err(e) => StepOutcome::Warning(format!(
                "{}. Remove the line for {} from {} manually.",
                e,
                record.domain,
                self.ctx.hosts.path().display()
            )),
        };
        steps.push(("Hosts alias".into(), hosts_outcome));

        registry.records.remove(index);
        self.ctx.store.save(&registry.records)?;
        steps.push((
            "Unregister".into(),
            StepOutcome::Success("Removed from configuration index.".into()),
        ));

        let activation = self.reload_unconditionally();
        info!(domain = %record.domain, "site deleted");

        Ok(DeleteResult {
            record,
            steps,
            activation,
        })
    }
}
