use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::common::constants::{
    DEFAULT_CLIENT_ID, DEFAULT_CLOUD_HOST, DEFAULT_LOG_DIR, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WORKING_DIR,
};
use crate::common::error::{BrandingError, Result};

pub const CONFIG_FILE_NAME: &str = "dcspray.toml";
pub const CONFIG_PATH_VAR: &str = "DCSPRAY_CONFIG";
pub const WORKING_DIR_VAR: &str = "DCSPRAY_WORKING_DIR";
pub const CLIENT_ID_VAR: &str = "DCSPRAY_CLIENT_ID";

/// Tool settings. Every field has a default, so the file is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// OAuth client used when `--client-id` is not given.
    pub client_id: String,
    /// Staging directory for the files of one run.
    pub working_dir: PathBuf,
    /// Public host that serves branding for on-premises installations.
    pub cloud_host: String,
    pub request_timeout_secs: u64,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            cloud_host: DEFAULT_CLOUD_HOST.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Reads `dcspray.toml` (or the file named by `DCSPRAY_CONFIG`) and applies
    /// environment overrides. A missing default file yields the defaults; a missing
    /// explicitly configured file is an error.
    pub fn load() -> Result<Self> {
        let config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(CONFIG_FILE_NAME).exists() => Self::from_file(Path::new(CONFIG_FILE_NAME))?,
            Err(_) => Self::default(),
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BrandingError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(BrandingError::Config("request_timeout_secs must be greater than 0".to_string()));
        }
        if self.cloud_host.trim().is_empty() {
            return Err(BrandingError::Config("cloud_host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Applies `DCSPRAY_WORKING_DIR` and `DCSPRAY_CLIENT_ID`; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(WORKING_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            self.working_dir = PathBuf::from(dir);
        }
        if let Some(client_id) = lookup(CLIENT_ID_VAR).filter(|v| !v.trim().is_empty()) {
            self.client_id = client_id;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
