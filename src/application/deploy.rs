use tracing::info;

use super::orchestrator::{non_empty, now_millis, parse_backend_host, parse_ip};
use super::{Activation, InputError, OperationError, RegistryOrchestrator, StepOutcome, Steps};
use crate::domain::{LOOPBACK, Port, SiteDomain, SiteRecord, SiteType};
use crate::infrastructure::activator::LinkOutcome;

/// Input for a new proxy site, as typed by the user.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub site_type: String,
    pub domain: String,
    pub port: String,
    pub backend_host: Option<String>,
    /// When set, a hosts alias is added for the domain pointing at this IP.
    pub hosts_ip: Option<String>,
}

impl DeployRequest {
    pub fn proxy(domain: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            site_type: SiteType::Proxy.to_string(),
            domain: domain.into(),
            port: port.into(),
            backend_host: None,
            hosts_ip: None,
        }
    }
}

#[derive(Debug)]
pub struct DeployResult {
    /// The record as it was (or would have been) registered.
    pub record: SiteRecord,
    pub registered: bool,
    pub steps: Steps,
    pub activation: Activation,
}

struct ValidDeploy {
    domain: SiteDomain,
    port: Port,
    backend_host: Option<String>,
    hosts_ip: Option<String>,
}

fn validate(request: &DeployRequest) -> Result<ValidDeploy, InputError> {
    request.site_type.parse::<SiteType>()?;
    let domain = SiteDomain::new(&request.domain)?;
    let port = request.port.parse::<Port>()?;
    let backend_host = non_empty(request.backend_host.as_deref())
        .map(parse_backend_host)
        .transpose()?;
    let hosts_ip = non_empty(request.hosts_ip.as_deref())
        .map(parse_ip)
        .transpose()?;

    Ok(ValidDeploy {
        domain,
        port,
        backend_host,
        hosts_ip,
    })
}

impl RegistryOrchestrator<'_> {
    /// Render, enable and validate a new site; register it only when the
    /// syntax check accepts it.
    pub fn deploy(&self, request: &DeployRequest) -> Result<DeployResult, OperationError> {
        let input = validate(request)?;
        self.ensure_no_pending_rename()?;

        let registry = self.ctx.store.load()?;
        if registry
            .position_of_primary(input.domain.primary(), None)
            .is_some()
        {
            return Err(InputError::Duplicate(input.domain.primary().to_string()).into());
        }

        let mut steps: Steps = Vec::new();
        let path = self.ctx.paths.sites_available.join(input.domain.primary());

        let mut record = SiteRecord::new(input.domain.clone(), input.port, path.clone(), now_millis());
        record.host = input.backend_host;
        record.ip = input.hosts_ip.clone().unwrap_or_else(|| LOOPBACK.to_string());

        self.write_site_file(&path, &record.domain, record.backend_host(), record.port)?;
        steps.push((
            "Write configuration".into(),
            StepOutcome::Success(format!("Wrote {}", path.display())),
        ));

        let link = self.ctx.activator.enable(&path, record.site_name())?;
        let link_msg = match link {
            LinkOutcome::AlreadyEnabled => StepOutcome::Skipped("Site already enabled.".into()),
            LinkOutcome::CreatedViaFallback => {
                StepOutcome::Success("Enable link created using the fallback command.".into())
            }
            LinkOutcome::Created | LinkOutcome::Replaced => StepOutcome::Success(format!(
                "Linked {}",
                self.ctx.activator.link_path(record.site_name()).display()
            )),
        };
        steps.push(("Enable site".into(), link_msg));

        let activation: Activation = self.gate().validate_and_activate().into();

        if let Activation::Rejected { .. } = activation {
            // Keep the broken file out of the live tree for the next reload.
            let retract = match self.ctx.activator.disable(record.site_name()) {
                Ok(_) => StepOutcome::Success(format!(
                    "Enable link removed; {} left for inspection.",
                    path.display()
                )),
                Err(e) => StepOutcome::Warning(e.to_string()),
            };
            steps.push(("Retract site".into(), retract));

            return Ok(DeployResult {
                record,
                registered: false,
                steps,
                activation,
            });
        }

        if let Some(ip) = &input.hosts_ip {
            let result = self.ctx.hosts.upsert(&record.domain, &record.domain, ip);
            steps.push((
                "Hosts alias".into(),
                self.hosts_outcome(result, ip, &record.domain),
            ));
        }

        self.ctx.store.append(&record)?;
        steps.push((
            "Register".into(),
            StepOutcome::Success("Configuration registered in index.".into()),
        ));
        info!(domain = %record.domain, port = %record.port, "site deployed");

        Ok(DeployResult {
            record,
            registered: true,
            steps,
            activation,
        })
    }
}
