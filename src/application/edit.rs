use std::fs;

use tracing::{info, warn};

use super::orchestrator::{non_empty, parse_backend_host, parse_ip};
use super::{Activation, InputError, OperationError, RegistryOrchestrator, StepOutcome, Steps};
use crate::domain::{LOOPBACK, Port, SiteDomain, SiteRecord};
use crate::infrastructure::activator::LinkOutcome;
use crate::infrastructure::journal::{RenamePlan, RenameStep};
use crate::infrastructure::registry::Registry;

/// Field overrides; `None` or blank keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub domain: Option<String>,
    pub port: Option<String>,
    pub backend_host: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug)]
pub struct EditResult {
    pub record: SiteRecord,
    pub renamed: bool,
    pub steps: Steps,
    pub activation: Activation,
}

fn apply_overrides(current: &SiteRecord, request: &EditRequest) -> Result<SiteRecord, InputError> {
    let mut updated = current.clone();
    if let Some(domain) = non_empty(request.domain.as_deref()) {
        updated.domain = SiteDomain::new(domain)?;
    }
    if let Some(port) = non_empty(request.port.as_deref()) {
        updated.port = port.parse::<Port>()?;
    }
    if let Some(host) = non_empty(request.backend_host.as_deref()) {
        updated.host = Some(parse_backend_host(host)?);
    }
    if let Some(ip) = non_empty(request.ip.as_deref()) {
        updated.ip = parse_ip(ip)?;
    }
    Ok(updated)
}

impl RegistryOrchestrator<'_> {
    /// Update a record's domain, port, backend host or alias IP.
    ///
    /// Changing the primary name renames the site file and its enable link
    /// through the rename journal, then goes through the validation gate.
    /// Other edits rewrite the file in place and reload.
    pub fn edit(&self, index: usize, request: &EditRequest) -> Result<EditResult, OperationError> {
        self.ensure_no_pending_rename()?;

        let mut registry = self.ctx.store.load()?;
        let current = self.record_at(&registry, index)?;
        let updated = apply_overrides(&current, request)?;

        if current.domain.is_primary(updated.domain.primary()) {
            return self.edit_in_place(&mut registry, index, current, updated);
        }

        if registry
            .position_of_primary(updated.domain.primary(), Some(index))
            .is_some()
        {
            return Err(InputError::Duplicate(updated.domain.primary().to_string()).into());
        }

        let dir = current
            .site_dir()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| self.ctx.paths.sites_available.clone());

        let mut plan = RenamePlan {
            index,
            created: current.created,
            old_domain: current.domain.clone(),
            new_domain: updated.domain.clone(),
            old_path: current.path.clone(),
            new_path: dir.join(updated.domain.primary()),
            port: updated.port,
            host: updated.host.clone(),
            ip: updated.ip.clone(),
            activate: current.is_active(),
            completed: Vec::new(),
        };
        self.ctx.journal.save(&plan)?;
        info!(old = %plan.old_domain, new = %plan.new_domain, "rename started");

        self.finish_rename(&mut plan)
    }

    /// Replay an interrupted rename. `Ok(None)` when nothing is pending.
    pub fn resume(&self) -> Result<Option<EditResult>, OperationError> {
        match self.ctx.journal.load()? {
            Some(mut plan) => {
                info!(old = %plan.old_domain, new = %plan.new_domain, "resuming rename");
                self.finish_rename(&mut plan).map(Some)
            }
            None => Ok(None),
        }
    }

    fn edit_in_place(
        &self,
        registry: &mut Registry,
        index: usize,
        current: SiteRecord,
        updated: SiteRecord,
    ) -> Result<EditResult, OperationError> {
        let mut steps: Steps = Vec::new();

        self.write_site_file(
            &updated.path,
            &updated.domain,
            updated.backend_host(),
            updated.port,
        )?;
        steps.push((
            "Render configuration".into(),
            StepOutcome::Success(format!("Updated {}", updated.path.display())),
        ));

        registry.records[index] = updated.clone();
        self.ctx.store.save(&registry.records)?;
        steps.push((
            "Update registry".into(),
            StepOutcome::Success("Configuration index updated.".into()),
        ));

        if updated.ip != current.ip || updated.domain != current.domain {
            let result = self
                .ctx
                .hosts
                .upsert(&current.domain, &updated.domain, &updated.ip);
            steps.push((
                "Hosts alias".into(),
                self.hosts_outcome(result, &updated.ip, &updated.domain),
            ));
        }

        let activation = self.reload_unconditionally();
        info!(domain = %updated.domain, "site updated in place");

        Ok(EditResult {
            record: updated,
            renamed: false,
            steps,
            activation,
        })
    }

    /// Run the remaining steps of `plan`, then validate and activate.
    /// A hard failure leaves the journal in place for `resume`.
    fn finish_rename(&self, plan: &mut RenamePlan) -> Result<EditResult, OperationError> {
        let mut steps: Steps = Vec::new();

        for step in plan.pending_steps() {
            let outcome = self.run_rename_step(plan, step)?;
            steps.push((step.label().to_string(), outcome));
            plan.mark_done(step);
            self.ctx.journal.save(plan)?;
        }

        let registry = self.ctx.store.load()?;
        let record = locate_renamed(&registry, plan)
            .and_then(|i| registry.get(i).cloned())
            .ok_or_else(|| OperationError::RecordMoved(plan.old_domain.to_string()))?;

        if record.is_active() && !self.ctx.activator.is_enabled(record.site_name()) {
            warn!(domain = %record.domain, "active site has no enable link after rename");
            steps.push((
                "Link state".into(),
                StepOutcome::Warning(format!(
                    "{} is recorded as active but has no enable link; toggle it off and on \
                     once {} is writable.",
                    record.domain,
                    self.ctx.paths.sites_enabled.display()
                )),
            ));
        }

        let activation: Activation = self.gate().validate_and_activate().into();
        self.ctx.journal.clear()?;
        info!(old = %plan.old_domain, new = %plan.new_domain, "rename finished");

        Ok(EditResult {
            record,
            renamed: true,
            steps,
            activation,
        })
    }

    fn run_rename_step(
        &self,
        plan: &RenamePlan,
        step: RenameStep,
    ) -> Result<StepOutcome, OperationError> {
        let activator = &self.ctx.activator;

        let outcome = match step {
            RenameStep::RemoveOldLink => match activator.disable(plan.old_site_name()) {
                Ok(true) => {
                    StepOutcome::Success(format!("Deleted old link: {}", plan.old_site_name()))
                }
                Ok(false) => StepOutcome::Skipped("No old link present.".into()),
                Err(e) => StepOutcome::Warning(format!("Could not delete old link: {}", e)),
            },

            RenameStep::MoveFile => {
                if plan.old_path == plan.new_path {
                    StepOutcome::Skipped("Path unchanged.".into())
                } else if plan.old_path.exists() {
                    fs::rename(&plan.old_path, &plan.new_path).map_err(|e| {
                        OperationError::filesystem("move site file to", &plan.new_path, e)
                    })?;
                    StepOutcome::Success(format!(
                        "Moved {} -> {}",
                        plan.old_path.display(),
                        plan.new_path.display()
                    ))
                } else {
                    StepOutcome::Skipped("No file at the old path; it will be rendered.".into())
                }
            }

            RenameStep::CreateNewLink => {
                if !plan.activate {
                    StepOutcome::Skipped("Site is inactive; no link created.".into())
                } else {
                    match activator.enable(&plan.new_path, plan.new_site_name()) {
                        Ok(LinkOutcome::AlreadyEnabled) => {
                            StepOutcome::Skipped("New link already present.".into())
                        }
                        Ok(LinkOutcome::CreatedViaFallback) => StepOutcome::Success(
                            "Created new link using the fallback command.".into(),
                        ),
                        Ok(_) => StepOutcome::Success(format!(
                            "Created new link: {}",
                            plan.new_site_name()
                        )),
                        Err(e) => StepOutcome::Warning(e.to_string()),
                    }
                }
            }

            RenameStep::RenderContent => {
                let host = plan.host.as_deref().unwrap_or(LOOPBACK);
                self.write_site_file(&plan.new_path, &plan.new_domain, host, plan.port)?;
                StepOutcome::Success(format!("Updated {}", plan.new_path.display()))
            }

            RenameStep::UpdateRecord => {
                let mut registry = self.ctx.store.load()?;
                let index = locate_renamed(&registry, plan)
                    .ok_or_else(|| OperationError::RecordMoved(plan.old_domain.to_string()))?;

                let record = &mut registry.records[index];
                record.domain = plan.new_domain.clone();
                record.path = plan.new_path.clone();
                record.port = plan.port;
                record.host = plan.host.clone();
                record.ip = plan.ip.clone();

                self.ctx.store.save(&registry.records)?;
                StepOutcome::Success("Configuration index updated.".into())
            }

            RenameStep::UpdateHosts => {
                let result = self
                    .ctx
                    .hosts
                    .upsert(&plan.old_domain, &plan.new_domain, &plan.ip);
                self.hosts_outcome(result, &plan.ip, &plan.new_domain)
            }
        };

        Ok(outcome)
    }
}

/// Find the record a rename targets: at its recorded position if it is
/// still there, otherwise anywhere with the same creation stamp.
fn locate_renamed(registry: &Registry, plan: &RenamePlan) -> Option<usize> {
    let belongs = |r: &SiteRecord| {
        r.created == plan.created && (r.domain == plan.old_domain || r.domain == plan.new_domain)
    };

    match registry.get(plan.index) {
        Some(r) if belongs(r) => Some(plan.index),
        _ => registry.records.iter().position(belongs),
    }
}
