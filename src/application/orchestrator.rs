use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use super::{Activation, InputError, OperationError, StepOutcome};
use crate::domain::{Port, SiteDomain, SiteRecord};
use crate::infrastructure::activator::SiteActivator;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::gate::ValidationGate;
use crate::infrastructure::hosts::{HostsChange, HostsError, HostsSync};
use crate::infrastructure::journal::RenameJournal;
use crate::infrastructure::paths::SitePaths;
use crate::infrastructure::registry::{Registry, RegistryStore};
use crate::infrastructure::render::ConfigRenderer;
use crate::infrastructure::service::ServiceController;

/// Everything an operation touches, built once per invocation.
pub struct SiteContext {
    pub paths: SitePaths,
    pub store: RegistryStore,
    pub renderer: ConfigRenderer,
    pub activator: SiteActivator,
    pub hosts: HostsSync,
    pub journal: RenameJournal,
}

impl SiteContext {
    pub fn new(paths: SitePaths, hosts_marker: impl Into<String>, link_fallback: Vec<String>) -> Self {
        Self {
            store: RegistryStore::new(paths.index_file.clone()),
            renderer: ConfigRenderer::new(),
            activator: SiteActivator::new(paths.sites_enabled.clone(), link_fallback),
            hosts: HostsSync::new(paths.hosts_file.clone(), hosts_marker),
            journal: RenameJournal::new(paths.journal_file.clone()),
            paths,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SitePaths::from_config(config),
            config.hosts.marker.clone(),
            config.commands.link_fallback.clone(),
        )
    }
}

/// Sequences registry, site file, enable link, hosts alias and service
/// reload into the Deploy, Edit, Delete and Toggle operations.
///
/// Operations take plain data and return a report; nothing here prints.
pub struct RegistryOrchestrator<'a> {
    pub(super) ctx: &'a SiteContext,
    pub(super) controller: &'a dyn ServiceController,
}

impl<'a> RegistryOrchestrator<'a> {
    pub fn new(ctx: &'a SiteContext, controller: &'a dyn ServiceController) -> Self {
        Self { ctx, controller }
    }

    pub(super) fn gate(&self) -> ValidationGate<'a> {
        ValidationGate::new(self.controller)
    }

    /// Refuse to mutate while an interrupted rename is waiting to be replayed.
    pub(super) fn ensure_no_pending_rename(&self) -> Result<(), OperationError> {
        match self.ctx.journal.load()? {
            Some(plan) => Err(OperationError::RenamePending(plan.old_domain.to_string())),
            None => Ok(()),
        }
    }

    pub(super) fn record_at(
        &self,
        registry: &Registry,
        index: usize,
    ) -> Result<SiteRecord, OperationError> {
        registry
            .get(index)
            .cloned()
            .ok_or(OperationError::InvalidSelection {
                selection: index.saturating_add(1),
                count: registry.len(),
            })
    }

    /// Reload without a syntax check, for changes that only remove or
    /// re-enable already validated site files.
    pub(super) fn reload_unconditionally(&self) -> Activation {
        match self.controller.reload() {
            Ok(()) => Activation::Reloaded,
            Err(e) => {
                warn!(error = %e, "reload failed");
                Activation::ReloadFailed {
                    message: e.to_string(),
                }
            }
        }
    }

    pub(super) fn write_site_file(
        &self,
        path: &Path,
        domain: &SiteDomain,
        backend_host: &str,
        port: Port,
    ) -> Result<(), OperationError> {
        let body = self.ctx.renderer.render(domain, backend_host, port);
        fs::write(path, body).map_err(|e| OperationError::filesystem("write", path, e))?;
        debug!(path = %path.display(), "site file written");
        Ok(())
    }

    /// Convert a hosts update into a report step; failures become a
    /// warning with the line the user has to add by hand.
    pub(super) fn hosts_outcome(
        &self,
        result: Result<HostsChange, HostsError>,
        ip: &str,
        domain: &SiteDomain,
    ) -> StepOutcome {
        let hosts = &self.ctx.hosts;
        match result {
            Ok(HostsChange::Updated { line_number }) => StepOutcome::Success(format!(
                "Updated hosts entry on line {}: {}",
                line_number,
                hosts.entry_line(ip, domain)
            )),
            Ok(HostsChange::Added) => {
                StepOutcome::Success(format!("Added hosts entry: {}", hosts.entry_line(ip, domain)))
            }
            Ok(HostsChange::AlreadyPresent { line_number }) => StepOutcome::Warning(format!(
                "Domain {} already exists in hosts file (line {}); left untouched",
                domain.primary(),
                line_number
            )),
            Ok(HostsChange::Unchanged) => {
                StepOutcome::Skipped("Hosts entry already up to date.".into())
            }
            Err(e) => StepOutcome::Warning(format!(
                "{}. {}",
                e,
                hosts.manual_instruction(ip, domain)
            )),
        }
    }
}

pub(super) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Treat missing and blank overrides alike.
pub(super) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) fn parse_ip(value: &str) -> Result<String, InputError> {
    value
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| InputError::Ip(value.to_string()))
}

/// A backend host ends up in a `proxy_pass` directive and an index line.
pub(super) fn parse_backend_host(value: &str) -> Result<String, InputError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '[' | ']'));
    if valid {
        Ok(value.to_string())
    } else {
        Err(InputError::BackendHost(value.to_string()))
    }
}
