// ── Device domain types ──

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

/// Every device of one organization, keyed by serial.
///
/// Ordered so the exposition output is stable between scrapes.
pub type DeviceMap = BTreeMap<String, DeviceRecord>;

/// Appliance uplink state as reported by `appliance/uplink/statuses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UplinkStatus {
    Active,
    Ready,
    Connecting,
    #[strum(serialize = "not connected")]
    NotConnected,
    Failed,
    /// Anything the Dashboard reports that is not one of the above.
    Unknown,
}

impl UplinkStatus {
    /// Parse a wire value; unrecognized strings become `Unknown`.
    pub fn from_wire(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Self::Unknown)
    }

    /// Numeric gauge value, `None` for `Unknown`.
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Active => Some(0),
            Self::Ready => Some(1),
            Self::Connecting => Some(2),
            Self::NotConnected => Some(3),
            Self::Failed => Some(4),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VpnMode {
    Hub,
    Spoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Reachability {
    Reachable,
    Unreachable,
    #[default]
    Unknown,
}

impl Reachability {
    pub fn from_wire(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.trim().parse().ok()).unwrap_or_default()
    }

    pub fn is_reachable(self) -> bool {
        self == Self::Reachable
    }
}

/// AutoVPN peer inside the same Dashboard account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerakiVpnPeer {
    pub network_id: String,
    pub network_name: String,
    pub reachability: Reachability,
}

/// Non-Meraki IPsec peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThirdPartyVpnPeer {
    pub name: String,
    pub public_ip: String,
    pub reachability: Reachability,
}

/// Latest usage interval of one uplink or AP-facing switch port.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortUsageRecord {
    // Bytes, only with byte-usage collection enabled
    pub usage_total_bytes: Option<f64>,
    pub usage_upstream_bytes: Option<f64>,
    pub usage_downstream_bytes: Option<f64>,

    // Average kbps over the interval
    pub bandwidth_total_kbps: f64,
    pub bandwidth_upstream_kbps: f64,
    pub bandwidth_downstream_kbps: f64,

    /// Display name of the access point on the other end of the port.
    pub ap_device_name: Option<String>,
}

impl PortUsageRecord {
    /// Whether this port feeds an access point rather than the wired backbone.
    pub fn is_access_point(&self) -> bool {
        self.ap_device_name.is_some()
    }
}

/// Everything known about one device after a collection cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceRecord {
    pub serial: String,

    // Identity
    pub org_name: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub mac: Option<String>,
    pub network_name: Option<String>,
    pub status: Option<String>,
    pub product_type: Option<String>,
    pub floor_name: Option<String>,

    // Addressing
    pub wan1_ip: Option<String>,
    pub wan2_ip: Option<String>,
    pub lan_ip: Option<String>,
    pub public_ip: Option<String>,
    pub using_cellular_failover: Option<bool>,

    // Uplink health
    pub latency_ms: Option<f64>,
    pub loss_percent: Option<f64>,
    pub uplinks: BTreeMap<String, UplinkStatus>,

    // VPN
    pub vpn_mode: Option<VpnMode>,
    pub exported_subnets: Vec<String>,
    pub meraki_vpn_peers: Vec<MerakiVpnPeer>,
    pub third_party_vpn_peers: Vec<ThirdPartyVpnPeer>,

    // Switch ports
    pub switch_port_usage: BTreeMap<String, PortUsageRecord>,

    // Wireless / system
    pub wireless_client_count: Option<u64>,
    pub wireless_ap_cpu_load_percent: Option<f64>,
    pub memory_used_percent: Option<f64>,

    /// Referenced by a secondary feed but absent from the inventory.
    pub missing_data: bool,
}

impl DeviceRecord {
    /// A bare record for a serial seen in the inventory.
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            ..Self::default()
        }
    }

    /// A placeholder for a serial the inventory never returned.
    pub fn stub(serial: impl Into<String>) -> Self {
        Self {
            missing_data: true,
            ..Self::new(serial)
        }
    }

    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }
}
