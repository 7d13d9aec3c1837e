//! TOML configuration for the `pdfs` client.
//!
//! ```toml
//! [server]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 30
//!
//! [defaults]
//! max_pages = 10
//! k = 10
//!
//! [upload]
//! on_failure = "abort"   # or "continue"
//! ```
//!
//! Every section is optional; [`Config::minimal`] is what an empty file
//! parses to.

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Requests never time out when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

/// Values used when the corresponding input is left empty.
#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_k")]
    pub k: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            k: default_k(),
        }
    }
}

fn default_max_pages() -> u32 {
    10
}
fn default_k() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UploadConfig {
    #[serde(default)]
    pub on_failure: UploadFailurePolicy,
}

/// What a batch upload does when one file fails.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadFailurePolicy {
    /// Stop at the first failure; remaining files are skipped.
    #[default]
    Abort,
    /// Log the failure and move on to the next file.
    Continue,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// The configured backend URL, parsed.
    pub fn base_url(&self) -> Result<Url> {
        parse_base_url(&self.server.base_url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid server.base_url: '{}'", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!(
            "server.base_url must use http or https, got '{}'",
            other
        ),
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// A file that exists but fails to parse or validate is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    parse_base_url(&config.server.base_url)?;

    if config.server.timeout_secs == Some(0) {
        anyhow::bail!("server.timeout_secs must be > 0 when set");
    }

    if config.defaults.max_pages == 0 {
        anyhow::bail!("defaults.max_pages must be >= 1");
    }

    if config.defaults.k == 0 {
        anyhow::bail!("defaults.k must be >= 1");
    }

    Ok(())
}
