use std::path::Path;

use anyhow::Result;

use sitectl::application::{Activation, RegistryOrchestrator};
use sitectl::application::deploy::DeployRequest;
use sitectl::domain::LOOPBACK;

use super::{Session, print_activation, print_steps};

pub struct DeployArgs {
    pub domains: Vec<String>,
    pub port: String,
    pub site_type: String,
    pub backend_host: Option<String>,
    pub hosts: bool,
    pub ip: Option<String>,
}

pub fn execute(args: DeployArgs, config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);

    let hosts_ip = if args.hosts || args.ip.is_some() {
        Some(args.ip.unwrap_or_else(|| LOOPBACK.to_string()))
    } else {
        None
    };

    let request = DeployRequest {
        site_type: args.site_type,
        domain: args.domains.join(" "),
        port: args.port,
        backend_host: args.backend_host,
        hosts_ip,
    };

    let result = orchestrator.deploy(&request)?;

    println!("Deploying {}...\n", result.record.domain);
    print_steps(&result.steps);
    print_activation(&result.activation);

    if result.registered {
        println!("\nDeployed: {}", result.record.domain);
        println!(
            "  Proxy: http://{} -> {}:{}",
            result.record.domain.primary(),
            result.record.backend_host(),
            result.record.port
        );
        if let Activation::ReloadFailed { .. } = result.activation {
            eprintln!(
                "  The configuration passed validation and is registered, but the running \
                 service has not loaded it. Reload the service manually."
            );
        }
    } else {
        println!("\nNot registered. Fix the configuration and deploy again.");
    }

    Ok(())
}
