//! Application configuration.

use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Get the path to the Gizmo config file. A `gizmo.config` in the current
/// directory takes precedence; otherwise `~/.gizmo/config.json` is used.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let local_config_path = std::env::current_dir()?.join("gizmo.config");
    if local_config_path.exists() {
        return Ok(local_config_path);
    }

    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    let config_path = home_path.join(".gizmo").join("config.json");
    Ok(config_path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Environment name. Empty means the built-in default.
    #[serde(default)]
    pub environment: String,

    /// Overrides the environment's base URL when non-empty.
    #[serde(default)]
    pub base_url: String,

    /// Session cookie string captured from an authenticated browser
    /// session. Replayed verbatim as the `Cookie` header; the CSRF token is
    /// read out of it. Empty when not logged in.
    #[serde(default)]
    pub cookie: String,
}

impl Config {
    /// Create a Config with the given session cookie.
    pub fn new(cookie: String, environment: Environment) -> Self {
        Config {
            environment: environment.to_string(),
            base_url: String::new(),
            cookie,
        }
    }

    /// The server base URL: the configured override, or the environment's
    /// default.
    pub fn resolve_base_url(&self, environment: Environment) -> String {
        if self.base_url.is_empty() {
            environment.base_url()
        } else {
            self.base_url.clone()
        }
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Remove the configuration file, logging the session out.
    pub fn clear_session(path: &Path) -> std::io::Result<()> {
        if !path.exists() {
            println!("No config file found at {}", path.display());
            return Ok(());
        }
        fs::remove_file(path)
    }
}
