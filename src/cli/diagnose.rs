use std::path::Path;

use anyhow::Result;

use sitectl::application::diagnose::Diagnose;

use super::Session;

pub fn execute(show_ports: bool, config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let report = Diagnose::new(&session.controller).execute();

    println!("System diagnostics:\n");

    match report.service_online {
        Ok(true) => println!("  Service:       online"),
        Ok(false) => println!("  Service:       OFFLINE"),
        Err(e) => eprintln!("  Service:       unknown ({})", e),
    }

    match report.syntax {
        Ok(check) if check.ok => println!("  Configuration: valid"),
        Ok(check) => {
            println!("  Configuration: INVALID");
            eprintln!("{}", check.diagnostics.trim_end());
        }
        Err(e) => eprintln!("  Configuration: check failed ({})", e),
    }

    match report.listening_ports {
        Ok(ports) => {
            println!("  Port scan:     completed");
            if show_ports {
                println!("\n{}", ports.trim_end());
            }
        }
        Err(e) => eprintln!("  Port scan:     failed ({})", e),
    }

    println!("\n  Sites enabled from: {}", session.config.server.sites_enabled.display());

    Ok(())
}
