use std::path::PathBuf;

use super::config::AppConfig;

const DATA_DIR: &str = "sitectl_data";
const INDEX_FILE: &str = "config_index";
const JOURNAL_FILE: &str = "rename.journal";

/// All resolved paths needed by sitectl components.
/// Loaded once from config, then passed to components via DI.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub data_dir: PathBuf,
    pub index_file: PathBuf,
    pub journal_file: PathBuf,
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
    pub hosts_file: PathBuf,
}

impl SitePaths {
    pub fn from_config(config: &AppConfig) -> Self {
        let data_dir = config.base_path.join(DATA_DIR);
        Self {
            index_file: data_dir.join(INDEX_FILE),
            journal_file: data_dir.join(JOURNAL_FILE),
            data_dir,
            sites_available: config.server.sites_available.clone(),
            sites_enabled: config.server.sites_enabled.clone(),
            hosts_file: config.hosts.file.clone(),
        }
    }
}
