pub mod delete;
pub mod deploy;
pub mod diagnose;
pub mod edit;
pub mod init;
pub mod list;
pub mod resume;
pub mod toggle;

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use sitectl::application::{Activation, SiteContext, StepOutcome, Steps};
use sitectl::infrastructure::config::{AppConfig, ConfigStore};
use sitectl::infrastructure::service::SystemServiceController;

/// Loaded configuration plus the components built from it.
pub struct Session {
    pub config: AppConfig,
    pub ctx: SiteContext,
    pub controller: SystemServiceController,
}

impl Session {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = ConfigStore::new(config_path.to_path_buf())
            .load()
            .context("Cannot establish base path")?;
        config.validate()?;

        Ok(Self {
            ctx: SiteContext::from_config(&config),
            controller: SystemServiceController::new(config.commands.clone()),
            config,
        })
    }
}

/// Convert the 1-based number shown by `list` into a registry index.
pub fn selection_index(selection: usize) -> Result<usize> {
    selection
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Invalid selection: configurations are numbered from 1"))
}

pub fn print_steps(steps: &Steps) {
    for (label, outcome) in steps {
        print_step(label, outcome);
    }
}

pub fn print_step(label: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Success(msg) => println!("  {}: {}", label, msg),
        StepOutcome::Warning(msg) => eprintln!("  {}: Warning: {}", label, msg),
        StepOutcome::Skipped(msg) => println!("  {}: {}", label, msg),
    }
}

pub fn print_activation(activation: &Activation) {
    match activation {
        Activation::Activated => println!("\nConfiguration validation passed; service reloaded."),
        Activation::Reloaded => println!("\nService reloaded."),
        Activation::Rejected { diagnostics } => {
            eprintln!("\nConfiguration validation FAILED; service not reloaded:");
            eprintln!("{}", diagnostics.trim_end());
        }
        Activation::ReloadFailed { message } => {
            eprintln!("\nWarning: service reload failed: {}", message);
        }
    }
}
