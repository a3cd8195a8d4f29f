//! Configuration file handling for smarthome-cli

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smarthome_client::{Credentials, DEFAULT_BASE_URL};
use std::path::{Path, PathBuf};

/// Device toggled by the API exercise when none is configured
pub const DEFAULT_DEVICE: &str = "lamp";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default server URL
    pub server: Option<String>,
    /// Device toggled by the API exercise
    pub device: Option<String>,
    /// HTTP Basic username
    pub username: Option<String>,
    /// HTTP Basic password
    pub password: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("smarthome-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(&self, args: ArgOverrides<'_>) -> MergedConfig {
        let username = args.username.map(String::from).or_else(|| self.username.clone());
        let password = args.password.map(String::from).or_else(|| self.password.clone());

        MergedConfig {
            server: args
                .server
                .map(String::from)
                .or_else(|| self.server.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            device: args
                .device
                .map(String::from)
                .or_else(|| self.device.clone())
                .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
            credentials: match (username, password) {
                (Some(username), Some(password)) => Some(Credentials::new(username, password)),
                _ => None,
            },
            no_color: args.no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Values given on the command line (or through their environment variables)
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgOverrides<'a> {
    pub server: Option<&'a str>,
    pub device: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub no_color: bool,
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub server: String,
    pub device: String,
    pub credentials: Option<Credentials>,
    pub no_color: bool,
}
