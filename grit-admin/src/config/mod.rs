//! Configuration and persisted client state
//!
//! Everything lives under one directory (`~/.config/grit-admin` by default):
//! `config.toml`, `session.toml`, `preferences.toml` and an optional
//! `resources/` directory of extra resource definitions.

pub mod preferences;
pub mod session;

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use preferences::Preferences;
pub use session::SessionFile;

pub const APP_DIR: &str = "grit-admin";
pub const API_URL_ENV: &str = "GRIT_API_URL";

pub const CONFIG_FILE: &str = "config.toml";
pub const SESSION_FILE: &str = "session.toml";
pub const PREFERENCES_FILE: &str = "preferences.toml";
pub const RESOURCES_DIR: &str = "resources";

/// `<platform config dir>/grit-admin`
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| anyhow!("Could not determine the config directory, pass --config-dir"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
    /// Used by resources that declare no page size
    pub default_page_size: usize,
    pub color: bool,
    #[serde(skip)]
    dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            default_page_size: 20,
            color: true,
            dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Read `config.toml` from `dir`; a missing file yields the defaults
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let mut config = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str::<Config>(&text)
                .with_context(|| format!("Invalid config file: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                Config::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };
        config.dir = dir.to_path_buf();
        Ok(config)
    }

    /// Load from `dir` (or the default directory), then apply `.env`, the
    /// environment and finally the command-line URL
    pub fn resolve(dir: Option<PathBuf>, api_url: Option<&str>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        let dir = match dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };
        let mut config = Self::load(&dir)?;
        config.apply_env(|key| std::env::var(key).ok());
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.dir.join(RESOURCES_DIR)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Whether the API is served over TLS
    pub fn is_secure(&self) -> bool {
        self.api_url.starts_with("https://")
    }
}

/// Write `contents` to `path`, creating parent directories
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.session_path(), dir.path().join("session.toml"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "api_url = \"https://api.example.com\"\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.default_page_size, 20);
        assert!(config.is_secure());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "api_url = [").unwrap();
        let err = Config::load(dir.path()).unwrap_err().to_string();
        assert!(err.contains("Invalid config file"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.apply_env(|key| (key == API_URL_ENV).then(|| "http://env:9000".to_string()));
        assert_eq!(config.api_url, "http://env:9000");

        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.api_url, "http://env:9000");
    }
}
