use tracing::info;

use super::{Activation, OperationError, RegistryOrchestrator, StepOutcome};
use crate::domain::{SiteRecord, SiteStatus};

#[derive(Debug)]
pub struct ToggleResult {
    pub record: SiteRecord,
    pub link: StepOutcome,
    pub activation: Activation,
}

impl RegistryOrchestrator<'_> {
    /// Flip a site between active and inactive.
    ///
    /// The link change must succeed before the new status is persisted, so
    /// the recorded status always matches the link.
    pub fn toggle(&self, index: usize) -> Result<ToggleResult, OperationError> {
        self.ensure_no_pending_rename()?;

        let mut registry = self.ctx.store.load()?;
        let mut record = self.record_at(&registry, index)?;
        let activator = &self.ctx.activator;

        record.status = record.status.toggled();
        let link = match record.status {
            SiteStatus::Active => {
                activator.enable(&record.path, record.site_name())?;
                StepOutcome::Success(format!("Enabled {}", record.site_name()))
            }
            SiteStatus::Inactive => {
                if activator.disable(record.site_name())? {
                    StepOutcome::Success(format!("Disabled {}", record.site_name()))
                } else {
                    StepOutcome::Skipped("Site was not enabled.".into())
                }
            }
        };

        registry.records[index] = record.clone();
        self.ctx.store.save(&registry.records)?;

        let activation = self.reload_unconditionally();
        info!(domain = %record.domain, status = %record.status, "site toggled");

        Ok(ToggleResult {
            record,
            link,
            activation,
        })
    }
}
