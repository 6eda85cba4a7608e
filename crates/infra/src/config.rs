//! Configuration loading and representation.
//!
//! Configuration lives in a single YAML file, by default `./config.yml`, overridable
//! with `STOCKROOM_CONFIG`. Only `postgres.url` is required when a `postgres`
//! section is present; every other key has a default.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use stockroom_observability::LogFormat;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "STOCKROOM_CONFIG";

/// Config file used when `STOCKROOM_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Absent means "run on the in-memory demo store".
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub apply_schema: bool,
}

// Keeps credentials in the URL out of logs.
impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("apply_schema", &self.apply_schema)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Parse configuration from YAML text and validate it.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Load configuration from `STOCKROOM_CONFIG`, or `./config.yml`.
    pub fn load_default() -> anyhow::Result<Self> {
        Self::load(config_path())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.bind_addr.trim().is_empty() {
            anyhow::bail!("server.bind_addr cannot be empty");
        }
        if let Some(pg) = &self.postgres {
            if pg.url.trim().is_empty() {
                anyhow::bail!("postgres.url cannot be empty");
            }
            if pg.max_connections == 0 {
                anyhow::bail!("postgres.max_connections must be at least 1");
            }
        }
        Ok(())
    }
}

/// Resolve the config file path from the environment.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
