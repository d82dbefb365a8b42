use std::path::Path;

use anyhow::Result;

use sitectl::application::RegistryOrchestrator;

use super::{Session, print_activation, print_step, selection_index};

pub fn execute(selection: usize, config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);
    let result = orchestrator.toggle(selection_index(selection)?)?;

    print_step("Link", &result.link);
    println!("Configuration {}: {}", result.record.status, result.record.domain);
    print_activation(&result.activation);

    Ok(())
}
