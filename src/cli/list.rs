use std::path::Path;

use anyhow::Result;

use sitectl::application::RegistryOrchestrator;

use super::{Session, selection_index};

pub fn execute(config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);
    let listing = orchestrator.list()?;

    for skipped in &listing.skipped {
        eprintln!(
            "Warning: index line {} ignored: {}",
            skipped.line_number, skipped.reason
        );
    }

    if listing.sites.is_empty() {
        println!("No configurations registered.");
        println!("\nDeploy one with:");
        println!("  sitectl deploy myapp.test --port 3000");
        return Ok(());
    }

    println!("Registered configurations:\n");
    for (i, site) in listing.sites.iter().enumerate() {
        let record = &site.record;
        let drift = if site.drifted() {
            if site.link_present {
                "  (link present but inactive)"
            } else {
                "  (link missing)"
            }
        } else {
            ""
        };
        println!(
            "  [{:02}] {:<8} {:<30} -> :{} ({}){}",
            i + 1,
            record.status,
            record.domain,
            record.port,
            record.site_type,
            drift
        );
    }

    Ok(())
}

pub fn show(selection: usize, config_path: &Path) -> Result<()> {
    let session = Session::load(config_path)?;
    let orchestrator = RegistryOrchestrator::new(&session.ctx, &session.controller);
    let record = orchestrator.preview(selection_index(selection)?)?;

    println!("Configuration [{:02}]:", selection);
    println!("  domain:  {}", record.domain);
    println!("  port:    {}", record.port);
    println!("  backend: {}", record.backend_host());
    println!("  type:    {}", record.site_type);
    println!("  ip:      {}", record.ip);
    println!("  path:    {}", record.path.display());
    println!("  status:  {}", record.status);
    println!(
        "  created: {}",
        humantime::format_rfc3339_seconds(
            std::time::UNIX_EPOCH + std::time::Duration::from_millis(record.created)
        )
    );
    for (key, value) in &record.extra {
        println!("  {}: {}", key, value);
    }

    Ok(())
}
