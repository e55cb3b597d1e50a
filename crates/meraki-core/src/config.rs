// ── Runtime collection configuration ──
//
// These types describe *what* to collect and *how* to reach the Dashboard.
// They carry the API key and tuning knobs, but never touch disk.
// The binary builds a `CollectorConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Public Dashboard API root.
pub const DEFAULT_BASE_URL: &str = meraki_api::dashboard::client::DEFAULT_BASE_URL;

/// Target used for the uplink loss/latency probe.
pub const DEFAULT_PROBE_IP: &str = "8.8.8.8";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(PathBuf),
}

/// Optional collections. Threaded by value through the collector and merge.
///
/// VPN and byte counters are off by default; floor plans are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    /// Fetch appliance VPN statuses.
    pub vpn: bool,
    /// Report switch port byte counters alongside bandwidth.
    pub port_usage_bytes: bool,
    /// Resolve floor-plan names (one extra call per wireless network).
    pub floor_plans: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            vpn: false,
            port_usage_bytes: false,
            floor_plans: true,
        }
    }
}

/// Lookback windows, in seconds, passed to the history endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timespans {
    pub loss_latency: u64,
    pub port_usage: u64,
    pub cpu_load: u64,
    pub memory: u64,
    pub memory_interval: u64,
}

impl Default for Timespans {
    fn default() -> Self {
        Self {
            loss_latency: 120,
            port_usage: 7200,
            cpu_load: 1200,
            memory: 1200,
            memory_interval: 300,
        }
    }
}

/// Configuration for collecting from the Dashboard API.
///
/// Built by the binary, passed to `Collector` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub api_key: SecretString,
    /// API root (e.g., `https://api.meraki.com/api/v1`).
    pub base_url: String,
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Retry budget for 429 / 502-504 responses.
    pub max_retries: u32,
    /// Upper bound on any single source fetch, pagination and retries included.
    pub fetch_timeout: Duration,
    /// Destination probed by the loss/latency endpoint.
    pub probe_ip: String,
    pub timespans: Timespans,
    pub collect: CollectOptions,
}

impl CollectorConfig {
    /// Defaults for everything but the key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            max_retries: 20,
            fetch_timeout: Duration::from_secs(60),
            probe_ip: DEFAULT_PROBE_IP.to_owned(),
            timespans: Timespans::default(),
            collect: CollectOptions::default(),
        }
    }
}
