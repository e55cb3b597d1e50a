//! Configuration for meraki-exporter.
//!
//! TOML file, environment overrides, API key resolution (env + plaintext),
//! and translation to `meraki_core::CollectorConfig`. The binary layers its
//! command-line flags on top.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use meraki_core::{CollectOptions, CollectorConfig, Timespans, TlsVerification};

/// Prefix of every environment override, e.g. `MERAKI_EXPORTER_LISTEN__PORT`.
pub const ENV_PREFIX: &str = "MERAKI_EXPORTER_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured (set MERAKI_API_KEY, api_key_env, or api_key)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API key (plaintext -- prefer `api_key_env` or `MERAKI_API_KEY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Dashboard API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to an extra CA certificate (TLS-intercepting proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub listen: Listen,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retries for rate-limited (429) and 502-504 responses.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound for any single source fetch, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Destination probed by the uplink loss/latency endpoint.
    #[serde(default = "default_probe_ip")]
    pub probe_ip: String,

    #[serde(default)]
    pub collect: Collect,

    #[serde(default)]
    pub timespans: TimespanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            base_url: default_base_url(),
            ca_cert: None,
            listen: Listen::default(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            fetch_timeout: default_fetch_timeout(),
            probe_ip: default_probe_ip(),
            collect: Collect::default(),
            timespans: TimespanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listen {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Listen {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Optional collections; floor plans are the only one on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Collect {
    #[serde(default)]
    pub vpn: bool,

    #[serde(default)]
    pub port_usage_bytes: bool,

    #[serde(default = "default_true")]
    pub floor_plans: bool,
}

impl Default for Collect {
    fn default() -> Self {
        Self {
            vpn: false,
            port_usage_bytes: false,
            floor_plans: true,
        }
    }
}

/// Lookback windows in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimespanConfig {
    #[serde(default = "default_loss_latency")]
    pub loss_latency: u64,

    #[serde(default = "default_port_usage")]
    pub port_usage: u64,

    #[serde(default = "default_cpu_load")]
    pub cpu_load: u64,

    #[serde(default = "default_memory")]
    pub memory: u64,

    #[serde(default = "default_memory_interval")]
    pub memory_interval: u64,
}

impl Default for TimespanConfig {
    fn default() -> Self {
        Self {
            loss_latency: default_loss_latency(),
            port_usage: default_port_usage(),
            cpu_load: default_cpu_load(),
            memory: default_memory(),
            memory_interval: default_memory_interval(),
        }
    }
}

fn default_base_url() -> String {
    meraki_core::config::DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    20
}
fn default_fetch_timeout() -> u64 {
    60
}
fn default_probe_ip() -> String {
    meraki_core::config::DEFAULT_PROBE_IP.into()
}
fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    9822
}
fn default_loss_latency() -> u64 {
    Timespans::default().loss_latency
}
fn default_port_usage() -> u64 {
    Timespans::default().port_usage
}
fn default_cpu_load() -> u64 {
    Timespans::default().cpu_load
}
fn default_memory() -> u64 {
    Timespans::default().memory
}
fn default_memory_interval() -> u64 {
    Timespans::default().memory_interval
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "meraki-exporter", "meraki-exporter").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("meraki-exporter");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then the TOML file, then `MERAKI_EXPORTER_*` variables.
///
/// `path` overrides the platform config location. A missing file is not an
/// error; every setting has a default except the API key.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Parse a TOML document on top of the defaults (no environment layer).
pub fn load_from_str(toml: &str) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml));
    Ok(figment.extract()?)
}

impl Config {
    /// Pretty TOML rendering with the plaintext key masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("********".into());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Socket address for the HTTP listener.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .listen
            .host
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "listen.host".into(),
                reason: format!("expected an IP address, got '{}'", self.listen.host),
            })?;
        Ok(SocketAddr::new(ip, self.listen.port))
    }
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the API key from the config (no CLI flag step).
///
/// 1. the environment variable named by `api_key_env`
/// 2. plaintext `api_key`
pub fn resolve_api_key(config: &Config) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = config.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }

    Err(ConfigError::NoCredentials)
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `CollectorConfig` from a loaded file and an already-resolved key.
pub fn to_collector_config(
    config: &Config,
    api_key: SecretString,
) -> Result<CollectorConfig, ConfigError> {
    let base: url::Url = config
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", config.base_url),
        })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{}'", base.scheme()),
        });
    }

    if config.probe_ip.parse::<IpAddr>().is_err() {
        return Err(ConfigError::Validation {
            field: "probe_ip".into(),
            reason: format!("expected an IP address, got '{}'", config.probe_ip),
        });
    }

    for (field, value) in [("timeout", config.timeout), ("fetch_timeout", config.fetch_timeout)] {
        if value == 0 {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: "must be at least 1 second".into(),
            });
        }
    }

    let tls = config
        .ca_cert
        .clone()
        .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);

    Ok(CollectorConfig {
        api_key,
        base_url: config.base_url.clone(),
        tls,
        timeout: Duration::from_secs(config.timeout),
        max_retries: config.max_retries,
        fetch_timeout: Duration::from_secs(config.fetch_timeout),
        probe_ip: config.probe_ip.clone(),
        timespans: Timespans {
            loss_latency: config.timespans.loss_latency,
            port_usage: config.timespans.port_usage,
            cpu_load: config.timespans.cpu_load,
            memory: config.timespans.memory,
            memory_interval: config.timespans.memory_interval,
        },
        collect: CollectOptions {
            vpn: config.collect.vpn,
            port_usage_bytes: config.collect.port_usage_bytes,
            floor_plans: config.collect.floor_plans,
        },
    })
}
