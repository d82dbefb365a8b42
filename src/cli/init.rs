use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use sitectl::infrastructure::config::{AppConfig, ConfigStore};
use sitectl::infrastructure::paths::SitePaths;

pub fn execute(base_path: PathBuf, force: bool, config_path: &Path) -> Result<()> {
    let config_store = ConfigStore::new(config_path.to_path_buf());
    if config_store.exists() && !force {
        bail!(
            "Configuration already exists at {}. Use --force to overwrite it.",
            config_store.path().display()
        );
    }

    let config = AppConfig::new(base_path);
    config.validate()?;
    let paths = SitePaths::from_config(&config);

    fs::create_dir_all(&paths.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            paths.data_dir.display()
        )
    })?;
    println!("  Data directory ready: {}", paths.data_dir.display());

    if !paths.index_file.exists() {
        fs::write(&paths.index_file, "").with_context(|| {
            format!(
                "Failed to create configuration index: {}",
                paths.index_file.display()
            )
        })?;
        println!("  Configuration index initialized.");
    }

    config_store.save(&config)?;
    println!("  Created config file: {}", config_store.path().display());

    println!("\nSystem ready. Deploy a site with: sitectl deploy <domain> --port <port>");
    Ok(())
}
