//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.expert-dashboard.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".expert-dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Statistics settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Session store settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Record source settings.
    #[serde(default)]
    pub source: SourceConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024 // 5MB
}

/// Category sets and limits used by the aggregator.
///
/// The category values are owned by the record source, so they live here
/// rather than in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Degrees counted as masters-and-above.
    #[serde(default = "default_advanced_degrees")]
    pub advanced_degrees: Vec<String>,

    /// School tiers counted as elite when a record carries no explicit flag.
    #[serde(default = "default_elite_tiers")]
    pub elite_tiers: Vec<String>,

    /// How many tech stack tags to keep.
    #[serde(default = "default_tech_stack_top_n")]
    pub tech_stack_top_n: usize,

    /// Task count at which an expert counts as high-volume.
    #[serde(default = "default_high_task_threshold")]
    pub high_task_threshold: u32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            advanced_degrees: default_advanced_degrees(),
            elite_tiers: default_elite_tiers(),
            tech_stack_top_n: default_tech_stack_top_n(),
            high_task_threshold: default_high_task_threshold(),
        }
    }
}

fn default_advanced_degrees() -> Vec<String> {
    vec!["硕士", "博士"].into_iter().map(String::from).collect()
}

fn default_elite_tiers() -> Vec<String> {
    vec!["985", "211", "海外名校"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_tech_stack_top_n() -> usize {
    10
}

fn default_high_task_threshold() -> u32 {
    10
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds. Sessions live until restart when unset.
    #[serde(default)]
    pub ttl_seconds: Option<u64>,

    /// How often the expiry sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Accept uploads with no usable ids (yields an all-zero summary).
    #[serde(default)]
    pub allow_empty_upload: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: None,
            sweep_interval_seconds: default_sweep_interval(),
            allow_empty_upload: false,
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

impl SessionConfig {
    /// Session lifetime as a duration, `None` when sessions never expire.
    pub fn ttl(&self) -> Result<Option<chrono::Duration>> {
        let Some(secs) = self.ttl_seconds else {
            return Ok(None);
        };
        if secs == 0 || secs > MAX_SESSION_TTL_SECONDS {
            bail!(
                "session.ttl_seconds must be between 1 and {}, got {}",
                MAX_SESSION_TTL_SECONDS,
                secs
            );
        }
        let secs = i64::try_from(secs).context("session.ttl_seconds is too large")?;
        let ttl = chrono::Duration::try_seconds(secs)
            .context("session.ttl_seconds is out of range")?;
        Ok(Some(ttl))
    }
}

/// Which record source backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Deterministic generated records (default)
    #[default]
    Mock,
    /// Records fetched from an HTTP endpoint
    Remote,
}

/// Record source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Endpoint for the remote source.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Remote request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Mock,
            remote_url: None,
            timeout_seconds: default_source_timeout(),
        }
    }
}

fn default_source_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ttl) = args.session_ttl {
            self.session.ttl_seconds = Some(ttl);
        }

        if let Some(kind) = args.source {
            self.source.kind = kind;
        }
        if let Some(ref url) = args.remote_url {
            self.source.remote_url = Some(url.clone());
        }
    }

    /// Check cross-field constraints after merging.
    pub fn validate(&self) -> Result<()> {
        if self.aggregation.advanced_degrees.is_empty() {
            bail!("aggregation.advanced_degrees must not be empty");
        }
        if self.aggregation.tech_stack_top_n == 0 {
            bail!("aggregation.tech_stack_top_n must be at least 1");
        }
        if self.session.sweep_interval_seconds == 0 {
            bail!("session.sweep_interval_seconds must be at least 1");
        }
        self.session.ttl()?;
        if self.source.kind == SourceKind::Remote && self.source.remote_url.is_none() {
            bail!("source.remote_url is required when source.kind = \"remote\"");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
