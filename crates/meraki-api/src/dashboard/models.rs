// Dashboard API response types
//
// Fields use `#[serde(default)]` liberally: the Dashboard omits keys, sends
// `null` for empty arrays, and mixes string and numeric port ids across
// endpoint generations. Everything that can be absent is an `Option` or an
// empty `Vec` so the core decides what absence means.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Deserialization helpers ──────────────────────────────────────────

/// Treat an explicit `null` like a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Port ids arrive as `"1"`, `1`, or `"1_MA-MOD-8X10G_1"`.
fn port_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected port id string or number, got {other}"
        ))),
    }
}

// ── Organizations ────────────────────────────────────────────────────

/// `GET /organizations` and `GET /organizations/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default, deserialize_with = "port_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Embedded `{ "id": ..., "name": ... }` network reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// One row of `GET /organizations/{id}/devices/availabilities`.
///
/// Older and newer device endpoints disagree on naming (`networkId` vs
/// nested `network.id`, `model` vs `productType`), so both spellings are
/// accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAvailability {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "product_type")]
    pub product_type: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkRef>,
    #[serde(default, alias = "network_id")]
    pub network_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub wan1_ip: Option<String>,
    #[serde(default)]
    pub wan2_ip: Option<String>,
    #[serde(default)]
    pub lan_ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub using_cellular_failover: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
}

impl DeviceAvailability {
    /// Network id from whichever field the endpoint populated.
    pub fn network_id(&self) -> Option<&str> {
        self.network
            .as_ref()
            .and_then(|n| n.id.as_deref())
            .or(self.network_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// One row of `GET /organizations/{id}/devices/uplinksLossAndLatency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkLossLatency {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub uplink: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub time_series: Vec<LossLatencySample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossLatencySample {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub loss_percent: Option<f64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

/// One row of `GET /organizations/{id}/devices/system/memory/usage/history/byInterval`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsageHistory {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub intervals: Vec<MemoryInterval>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInterval {
    #[serde(default)]
    pub start_ts: Option<String>,
    #[serde(default)]
    pub end_ts: Option<String>,
    #[serde(default)]
    pub memory: Option<MemoryStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub used: Option<MemoryUsed>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryUsed {
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub percentages: Option<MemoryPercentages>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryPercentages {
    #[serde(default)]
    pub maximum: Option<f64>,
}

// ── Appliance ────────────────────────────────────────────────────────

/// One row of `GET /organizations/{id}/appliance/uplink/statuses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceUplinkStatus {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub uplinks: Vec<UplinkInterfaceStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkInterfaceStatus {
    #[serde(default, deserialize_with = "nullable")]
    pub interface: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
}

/// One row of `GET /organizations/{id}/appliance/vpn/statuses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpnStatus {
    #[serde(default)]
    pub device_serial: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub network_name: Option<String>,
    #[serde(default)]
    pub device_status: Option<String>,
    #[serde(default)]
    pub vpn_mode: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub exported_subnets: Vec<ExportedSubnet>,
    #[serde(default, deserialize_with = "nullable")]
    pub meraki_vpn_peers: Vec<MerakiVpnPeerStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub third_party_vpn_peers: Vec<ThirdPartyVpnPeerStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportedSubnet {
    #[serde(default, deserialize_with = "nullable")]
    pub subnet: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerakiVpnPeerStatus {
    #[serde(default, deserialize_with = "nullable")]
    pub network_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub network_name: String,
    #[serde(default)]
    pub reachability: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyVpnPeerStatus {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub public_ip: String,
    #[serde(default)]
    pub reachability: Option<String>,
}

// ── Switch ───────────────────────────────────────────────────────────

/// One device of `GET /organizations/{id}/switch/ports/usage/history/byDevice/byInterval`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortUsageHistory {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<PortUsageIntervals>,
}

impl SwitchPortUsageHistory {
    /// Whether at least one port carries interval samples.
    pub fn has_interval_data(&self) -> bool {
        self.ports.iter().any(|p| !p.intervals.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortUsageIntervals {
    #[serde(default, deserialize_with = "port_id")]
    pub port_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub intervals: Vec<PortUsageInterval>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortUsageInterval {
    #[serde(default)]
    pub start_ts: Option<String>,
    #[serde(default)]
    pub end_ts: Option<String>,
    #[serde(default)]
    pub data: Option<DataUsage>,
    #[serde(default)]
    pub bandwidth: Option<BandwidthUsage>,
}

/// `data.usage`: kilobytes transferred during the interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataUsage {
    #[serde(default)]
    pub usage: Option<UsageCounters>,
}

/// `bandwidth.usage`: average kbps during the interval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandwidthUsage {
    #[serde(default)]
    pub usage: Option<UsageCounters>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageCounters {
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub upstream: Option<f64>,
    #[serde(default)]
    pub downstream: Option<f64>,
}

/// One switch of `GET /organizations/{id}/switch/ports/bySwitch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPorts {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<SwitchPortConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortConfig {
    #[serde(default, deserialize_with = "port_id")]
    pub port_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// One switch of `GET /organizations/{id}/switch/ports/statuses/bySwitch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortStatuses {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<SwitchPortStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortStatus {
    #[serde(default, deserialize_with = "port_id")]
    pub port_id: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    /// `"Connected"`, `"Disconnected"`, or `"Disabled"`.
    #[serde(default)]
    pub status: Option<String>,
}

/// One switch of `GET /organizations/{id}/switch/ports/topology/discovery/byDevice`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortTopology {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ports: Vec<PortTopology>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortTopology {
    #[serde(default, deserialize_with = "port_id")]
    pub port_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub cdp: Vec<DiscoveryField>,
    #[serde(default, deserialize_with = "nullable")]
    pub lldp: Vec<DiscoveryField>,
}

/// One `{ "name": "System name", "value": "..." }` pair from CDP or LLDP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryField {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl DiscoveryField {
    /// The value rendered as plain text (numbers and booleans included).
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ── Wireless ─────────────────────────────────────────────────────────

/// One row of `GET /organizations/{id}/wireless/clients/overview/byDevice`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirelessClientOverview {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkRef>,
    #[serde(default)]
    pub counts: Option<ClientCounts>,
}

impl WirelessClientOverview {
    /// `counts.byStatus.online`, when every level is present.
    pub fn online_clients(&self) -> Option<u64> {
        self.counts.as_ref()?.by_status.as_ref()?.online
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCounts {
    #[serde(default)]
    pub by_status: Option<ClientsByStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientsByStatus {
    #[serde(default)]
    pub online: Option<u64>,
}

/// One row of `GET /organizations/{id}/wireless/devices/system/cpu/load/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirelessCpuLoad {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub cpu_count: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub series: Vec<CpuLoadSample>,
}

/// `cpuLoad5` is a 5-minute load average in 1/65536 fixed point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuLoadSample {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub cpu_load5: Option<f64>,
}

// ── Networks ─────────────────────────────────────────────────────────

/// One row of `GET /organizations/{id}/networks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub product_types: Vec<String>,
}

impl Network {
    pub fn has_product(&self, product: &str) -> bool {
        self.product_types.iter().any(|p| p == product)
    }
}

/// One row of `GET /networks/{id}/floorPlans`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    #[serde(default)]
    pub floor_plan_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub devices: Vec<FloorPlanDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorPlanDevice {
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        ApplianceUplinkStatus, DeviceAvailability, Network, PortTopology, SwitchPortConfig,
        VpnStatus, WirelessClientOverview,
    };

    #[test]
    fn port_ids_accept_numbers_and_strings() {
        let numeric: SwitchPortConfig =
            serde_json::from_value(json!({ "portId": 7, "tags": ["uplink"] })).expect("decodes");
        assert_eq!(numeric.port_id, "7");

        let modular: SwitchPortConfig =
            serde_json::from_value(json!({ "portId": "1_MA-MOD-8X10G_1" })).expect("decodes");
        assert_eq!(modular.port_id, "1_MA-MOD-8X10G_1");
        assert!(modular.tags.is_empty());
    }

    #[test]
    fn null_discovery_lists_become_empty() {
        let port: PortTopology =
            serde_json::from_value(json!({ "portId": "3", "cdp": null, "lldp": null }))
                .expect("decodes");
        assert!(port.cdp.is_empty());
        assert!(port.lldp.is_empty());
    }

    #[test]
    fn null_string_leaves_decode_as_empty() {
        let vpn: VpnStatus = serde_json::from_value(json!({
            "deviceSerial": "Q2XX-0001",
            "exportedSubnets": [{ "subnet": null }],
            "merakiVpnPeers": [{ "networkId": null, "networkName": null, "reachability": "reachable" }],
            "thirdPartyVpnPeers": [{ "name": "Azure", "publicIp": null, "reachability": null }]
        }))
        .expect("decodes");
        assert_eq!(vpn.exported_subnets[0].subnet, "");
        assert_eq!(vpn.meraki_vpn_peers[0].network_id, "");
        assert_eq!(vpn.third_party_vpn_peers[0].name, "Azure");
        assert_eq!(vpn.third_party_vpn_peers[0].public_ip, "");

        let uplinks: ApplianceUplinkStatus = serde_json::from_value(json!({
            "serial": "Q2XX-0001",
            "uplinks": [{ "interface": "wan1", "status": null }]
        }))
        .expect("decodes");
        assert_eq!(uplinks.uplinks[0].interface, "wan1");
        assert_eq!(uplinks.uplinks[0].status, "");

        let network: Network =
            serde_json::from_value(json!({ "id": null, "name": "Branch-42" })).expect("decodes");
        assert!(network.id.is_empty());
    }

    #[test]
    fn network_id_prefers_nested_reference() {
        let nested: DeviceAvailability = serde_json::from_value(json!({
            "serial": "Q2XX-0001",
            "network": { "id": "N_1" },
            "networkId": "N_2"
        }))
        .expect("decodes");
        assert_eq!(nested.network_id(), Some("N_1"));

        let flat: DeviceAvailability =
            serde_json::from_value(json!({ "serial": "Q2XX-0002", "networkId": "N_2" }))
                .expect("decodes");
        assert_eq!(flat.network_id(), Some("N_2"));
    }

    #[test]
    fn online_clients_walks_nested_counts() {
        let row: WirelessClientOverview = serde_json::from_value(json!({
            "serial": "Q2MR-0001",
            "counts": { "byStatus": { "online": 12 } }
        }))
        .expect("decodes");
        assert_eq!(row.online_clients(), Some(12));

        let empty: WirelessClientOverview =
            serde_json::from_value(json!({ "serial": "Q2MR-0002" })).expect("decodes");
        assert_eq!(empty.online_clients(), None);
    }
}
