use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChatError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_AGENT_PATH: &str = "/agent";

/// Environment variable that overrides the configured base URL
pub const API_URL_ENV: &str = "AGENTCHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_agent_path")]
    pub agent_path: String,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_agent_path() -> String {
    DEFAULT_AGENT_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            agent_path: default_agent_path(),
            log_file: None,
        }
    }

    /// Load from the user config dir, then apply the environment override
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Full URL of the agent endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.agent_path.trim_start_matches('/')
        )
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::Config("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("agentchat"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
