use std::path::Path;

use anyhow::{Result, bail};

use sitectl::application::RegistryOrchestrator;
use sitectl::application::edit::EditRequest;

use super::{Session, print_activation, print_steps, selection_index};

pub fn execute(selection: usize, request: EditRequest, config_path: &Path) -> Result<()> {
    if request.domain.is_none()
        && request.port.is_none()
        && request.backend_host.is_none()
        && request.ip.is_none()
    {
        bail!("Nothing to change. Pass at least one of --domain, --port, --host, --ip.");
    }

    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);
    let result = orchestrator.edit(selection_index(selection)?, &request)?;

    println!("Updating {}...\n", result.record.domain);
    print_steps(&result.steps);
    print_activation(&result.activation);

    if result.renamed && !result.activation.took_effect() {
        eprintln!("The rename was applied on disk but is not live yet.");
    }

    Ok(())
}
