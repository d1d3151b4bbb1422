//! Host configuration: a TOML file wrapping the engine's [`SearchConfig`].
//!
//! ```toml
//! [search]
//! sources = ["watchman", "physrisk"]
//! search_timeout_seconds = 15
//!
//! [search.endpoints]
//! watchman = "https://watchman.internal/api/v1"
//! ```
//!
//! Endpoint URLs can be overridden per source from the environment.
//! Credentials never live in this file; see [`crate::credentials`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use unisearch_engine::{SearchConfig, Source};

use crate::error::{AppError, Result};

/// Environment variable naming an alternative config directory.
pub const CONFIG_DIR_ENV: &str = "UNISEARCH_CONFIG_DIR";

/// Environment variables overriding each source's base URL.
pub const ENDPOINT_ENV_VARS: [(Source, &str); 3] = [
    (Source::PhysRisk, "PHYSRISK_BASE_URL"),
    (Source::Trafilatura, "TRAFILATURA_BASE_URL"),
    (Source::Watchman, "WATCHMAN_BASE_URL"),
];

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine settings.
    pub search: SearchConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load from `path` if given, otherwise from [`default_config_path`].
    ///
    /// An explicit path must exist. A missing default file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be read or
    /// parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Replace endpoint URLs with any set through `lookup`, which maps an
    /// environment variable name to its value.
    #[must_use]
    pub fn with_endpoint_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for (source, var) in ENDPOINT_ENV_VARS {
            let Some(url) = lookup(var).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            tracing::debug!(%source, var, "endpoint overridden from environment");
            let slot = match source {
                Source::PhysRisk => &mut self.search.endpoints.physrisk,
                Source::Trafilatura => &mut self.search.endpoints.trafilatura,
                Source::Watchman => &mut self.search.endpoints.watchman,
            };
            *slot = url.trim().to_owned();
        }
        self
    }

    /// [`with_endpoint_overrides`](Self::with_endpoint_overrides) against
    /// the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_endpoint_overrides(|var| std::env::var(var).ok())
    }

    /// # Errors
    ///
    /// Returns the engine's validation error.
    pub fn validate(&self) -> Result<()> {
        self.search.validate().map_err(AppError::from)
    }
}

/// Config directory: `$UNISEARCH_CONFIG_DIR`, else the platform config
/// directory (`$XDG_CONFIG_HOME` or `~/.config` on Linux) plus `unisearch`.
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("unisearch"))
        .unwrap_or_else(|| PathBuf::from("/tmp/unisearch-config"))
}

/// Default config file path: `config_dir()/config.toml`.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}
