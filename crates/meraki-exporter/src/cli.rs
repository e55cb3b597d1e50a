//! Clap derive structures for the exporter binary.

use std::path::PathBuf;

use clap::Parser;

/// Prometheus exporter for the Meraki Dashboard API
#[derive(Debug, Parser)]
#[command(name = "meraki-exporter", version, about, long_about = None)]
pub struct Cli {
    /// Dashboard API key
    #[arg(long, short = 'k', env = "MERAKI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Config file path (defaults to the platform config directory)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// IP address to listen on
    #[arg(long, short = 'i')]
    pub host: Option<String>,

    /// HTTP port to listen on for Prometheus scrapes
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Also collect appliance VPN statuses
    #[arg(long)]
    pub vpn: bool,

    /// Also report per-port byte counters for uplink and AP ports
    #[arg(long)]
    pub port_usage_bytes: bool,

    /// Skip floor-plan lookups for wireless devices
    #[arg(long)]
    pub no_floor_plans: bool,

    /// Dashboard API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Destination IP probed by appliances for loss and latency
    #[arg(long)]
    pub probe_ip: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Upper bound for a single source fetch in seconds
    #[arg(long)]
    pub fetch_timeout: Option<u64>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the effective configuration (API key masked) and exit
    #[arg(long)]
    pub print_config: bool,
}
