//! Application configuration management.
//!
//! Configuration is stored at `~/.config/upclub/config.json` and can be
//! overridden through the `UPCLUB_API_URL` and `UPCLUB_BOT_URL`
//! environment variables (a `.env` file is honored by the binary).
//!
//! Both URLs are optional: without an API URL the balance synchronizer
//! degrades to a no-op, and without a bot URL the login flow falls back
//! to a demo session.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
const APP_NAME: &str = "upclub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub bot_url: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("UPCLUB_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(url) = std::env::var("UPCLUB_BOT_URL") {
            config.bot_url = Some(url);
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// The validated API base URL, if one is configured.
    pub fn api_url(&self) -> Option<&str> {
        let url = self.api_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        if !url.starts_with("http") {
            warn!(url = url, "API URL must start with http:// or https://; ignoring");
            return None;
        }
        Some(url)
    }

    /// The Telegram bot deep-link URL, if one is configured.
    pub fn bot_url(&self) -> Option<&str> {
        self.bot_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
