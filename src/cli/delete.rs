use std::path::Path;

use anyhow::Result;

use sitectl::application::RegistryOrchestrator;

use super::{Session, print_activation, print_steps, selection_index};

pub fn execute(selection: usize, force: bool, config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);
    let index = selection_index(selection)?;

    if !force {
        let record = orchestrator.preview(index)?;
        println!("This will delete the configuration:");
        println!("  Domain: {}", record.domain);
        println!("  File:   {}", record.path.display());
        println!("  Hosts entries tagged for this domain are removed too.");
        println!("\nRun with --force to confirm.");
        return Ok(());
    }

    let result = orchestrator.delete(index)?;

    println!("Deleting {}...\n", result.record.domain);
    print_steps(&result.steps);
    print_activation(&result.activation);

    Ok(())
}
