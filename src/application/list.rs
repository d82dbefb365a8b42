use super::{OperationError, RegistryOrchestrator};
use crate::domain::SiteRecord;
use crate::infrastructure::registry::SkippedLine;

pub struct ListedSite {
    pub record: SiteRecord,
    pub link_present: bool,
}

impl ListedSite {
    /// Recorded status disagrees with the enable link on disk.
    pub fn drifted(&self) -> bool {
        self.record.is_active() != self.link_present
    }
}

pub struct SiteListing {
    pub sites: Vec<ListedSite>,
    pub skipped: Vec<SkippedLine>,
}

impl RegistryOrchestrator<'_> {
    pub fn list(&self) -> Result<SiteListing, OperationError> {
        let registry = self.ctx.store.load()?;
        let sites = registry
            .records
            .into_iter()
            .map(|record| ListedSite {
                link_present: self.ctx.activator.is_enabled(record.site_name()),
                record,
            })
            .collect();

        Ok(SiteListing {
            sites,
            skipped: registry.skipped,
        })
    }
}
