use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::service::CommandSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration at {0}. Run 'sitectl init --base-path <DIR>' first.")]
    NotInitialized(PathBuf),

    #[error("Could not determine home directory; pass --config explicitly")]
    NoHomeDir,

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("System path not found: {0}")]
    BasePathMissing(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostsConfig {
    pub file: PathBuf,
    /// Comment tag identifying lines managed by sitectl.
    pub marker: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("/etc/hosts"),
            marker: "Added by sitectl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Root under which the data directory and registry index live.
    pub base_path: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hosts: HostsConfig,
    #[serde(default)]
    pub commands: CommandSet,
}

impl AppConfig {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            server: ServerConfig::default(),
            hosts: HostsConfig::default(),
            commands: CommandSet::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_path.is_dir() {
            return Err(ConfigError::BasePathMissing(self.base_path.clone()));
        }
        Ok(())
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.sitectl/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".sitectl").join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.path.exists() {
            return Err(ConfigError::NotInitialized(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_requires_init() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("config.toml"));
        assert!(matches!(store.load(), Err(ConfigError::NotInitialized(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("config.toml"));
        let config = AppConfig::new(dir.path().to_path_buf());

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: AppConfig = toml::from_str(
            r#"
            base_path = "/srv/sitectl"

            [hosts]
            marker = "managed"
            "#,
        )
        .unwrap();

        assert_eq!(config.hosts.marker, "managed");
        assert_eq!(config.hosts.file, PathBuf::from("/etc/hosts"));
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.commands.check, vec!["sudo", "nginx", "-t"]);
    }

    #[test]
    fn test_validate_base_path() {
        let dir = TempDir::new().unwrap();
        assert!(AppConfig::new(dir.path().to_path_buf()).validate().is_ok());
        assert!(matches!(
            AppConfig::new(dir.path().join("missing")).validate(),
            Err(ConfigError::BasePathMissing(_))
        ));
    }
}
