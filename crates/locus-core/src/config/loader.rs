use super::schema::LocusConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./locus.yaml
    /// 2. ~/.locus/config.yaml
    /// 3. Default configuration
    pub fn load_default() -> Result<LocusConfig, ConfigError> {
        let local_config = PathBuf::from("./locus.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config);
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".locus").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(LocusConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<LocusConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<LocusConfig, ConfigError> {
        let config: LocusConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}
