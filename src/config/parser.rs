use super::NetworkConfig;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["testnet.yaml", "testnet.yml"];

pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // Try parent directory
        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(
            "Could not find testnet.yaml in current directory or any parent".to_string(),
        ))
    }

    /// Load and validate config from file path
    pub fn load_config<P: AsRef<Path>>(&self, path: P) -> Result<NetworkConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        tracing::debug!("Loaded config from {}", path.as_ref().display());
        self.parse_config(&content)
    }

    /// Parse and validate config from a YAML string
    pub fn parse_config(&self, content: &str) -> Result<NetworkConfig> {
        let config: NetworkConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
