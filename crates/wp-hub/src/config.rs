//! # Config
//!
//! Settings loaded once in `main` from an optional TOML file, overridden by
//! CLI flags and environment, then handed to the store and server. Nothing
//! below `main` reads the environment.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Default, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    /// MongoDB connection string. When absent the in-memory store may be used.
    #[serde(default)]
    pub database_url: Option<String>,
    /// JSON seed file bulk-loaded into the store at startup.
    #[serde(default)]
    pub seed: Option<PathBuf>,
    #[serde(default = "default_query_timeout")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_in_memory_fallback")]
    pub in_memory_fallback: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            seed: None,
            query_timeout_ms: default_query_timeout(),
            in_memory_fallback: default_in_memory_fallback(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3001".into()
}
fn default_query_timeout() -> u64 {
    5000
}
fn default_in_memory_fallback() -> bool {
    true
}

/// Which store backend the service talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Mongo { url: String },
    Memory,
}

/// Values from the command line (or its env fallbacks) that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub database_url: Option<String>,
    pub seed: Option<PathBuf>,
    pub production: bool,
}

impl Config {
    /// Read `path` if it exists. A missing file yields defaults; a malformed
    /// one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(bind) = &overrides.bind {
            self.server.bind = bind.clone();
        }
        if let Some(url) = &overrides.database_url {
            self.store.database_url = Some(url.clone());
        }
        if let Some(seed) = &overrides.seed {
            self.store.seed = Some(seed.clone());
        }
        if overrides.production {
            self.store.in_memory_fallback = false;
        }
    }

    pub fn backend(&self) -> anyhow::Result<Backend> {
        match self.store.database_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Backend::Mongo {
                url: url.to_string(),
            }),
            _ if self.store.in_memory_fallback => Ok(Backend::Memory),
            _ => bail!("DATABASE_URL is not set"),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.store.query_timeout_ms)
    }
}
