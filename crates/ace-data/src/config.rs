use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "ACE_API_BASE_URL";
pub const ENV_DEBUG: &str = "ACE_DEBUG";
pub const ENV_TOKEN_STORE: &str = "ACE_TOKEN_STORE";

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Startup configuration for a production engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefix for relative endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Turns on the response logging interceptor.
    #[serde(default)]
    pub debug: bool,
    /// JSON file holding `authToken`. Defaults to `~/.ace/auth.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_store: Option<PathBuf>,
    /// Extra YAML template catalogue merged over the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debug: false,
            token_store: None,
            templates: None,
        }
    }
}

impl EngineConfig {
    /// Read YAML from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(s) if s.trim().is_empty() => Ok(Self::default()),
            Ok(s) => Ok(serde_yaml::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `ACE_API_BASE_URL`, `ACE_DEBUG` and `ACE_TOKEN_STORE` when set.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            self.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(path) = lookup(ENV_TOKEN_STORE).filter(|v| !v.is_empty()) {
            self.token_store = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        }
    }

    /// Configured token store path, or `~/.ace/auth.json`.
    pub fn token_store_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(p) = &self.token_store {
            return Ok(p.clone());
        }
        let home = home::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ace").join("auth.json"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
