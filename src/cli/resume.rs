use std::path::Path;

use anyhow::Result;

use sitectl::application::RegistryOrchestrator;

use super::{Session, print_activation, print_steps};

pub fn execute(config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);

    match orchestrator.resume()? {
        Some(result) => {
            println!("Finishing rename to {}...\n", result.record.domain);
            print_steps(&result.steps);
            print_activation(&result.activation);
        }
        None => println!("No unfinished rename."),
    }

    Ok(())
}
