// ── Prometheus text exposition ──
//
// Each scrape builds a fresh `Registry` holding one `GaugeVec` per enabled
// family, fills it from the device records and encodes it with
// `TextEncoder`. Nothing survives between scrapes.

use std::collections::HashMap;
use std::time::Duration;

use meraki_core::{CollectOptions, DeviceRecord, PortUsageRecord, VpnMode};
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::warn;

/// `Content-Type` of a scrape response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Labels every per-device sample carries, in value order.
const DEVICE_LABELS: [&str; 5] = ["serial", "name", "networkName", "orgName", "orgId"];

/// Every per-device metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Family {
    // ── Device health ──
    #[strum(serialize = "meraki_device_latency")]
    DeviceLatency,
    #[strum(serialize = "meraki_device_loss_percent")]
    DeviceLossPercent,
    #[strum(serialize = "meraki_device_status")]
    DeviceStatus,
    #[strum(serialize = "meraki_device_using_cellular_failover")]
    CellularFailover,
    #[strum(serialize = "meraki_device_uplink_status")]
    UplinkStatus,
    #[strum(serialize = "meraki_device_missing_data")]
    MissingData,

    // ── VPN ──
    #[strum(serialize = "meraki_vpn_mode")]
    VpnMode,
    #[strum(serialize = "meraki_vpn_exported_subnets")]
    VpnExportedSubnets,
    #[strum(serialize = "meraki_vpn_meraki_peers")]
    VpnMerakiPeers,
    #[strum(serialize = "meraki_vpn_third_party_peers")]
    VpnThirdPartyPeers,

    // ── Switch uplink ports ──
    #[strum(serialize = "meraki_switch_port_usage_total_bytes")]
    SwitchPortUsageTotal,
    #[strum(serialize = "meraki_switch_port_usage_upstream_bytes")]
    SwitchPortUsageUpstream,
    #[strum(serialize = "meraki_switch_port_usage_downstream_bytes")]
    SwitchPortUsageDownstream,
    #[strum(serialize = "meraki_switch_port_bandwidth_total_kbps")]
    SwitchPortBandwidthTotal,
    #[strum(serialize = "meraki_switch_port_bandwidth_upstream_kbps")]
    SwitchPortBandwidthUpstream,
    #[strum(serialize = "meraki_switch_port_bandwidth_downstream_kbps")]
    SwitchPortBandwidthDownstream,

    // ── Switch ports facing access points ──
    #[strum(serialize = "meraki_ap_port_usage_total_bytes")]
    ApPortUsageTotal,
    #[strum(serialize = "meraki_ap_port_usage_upstream_bytes")]
    ApPortUsageUpstream,
    #[strum(serialize = "meraki_ap_port_usage_downstream_bytes")]
    ApPortUsageDownstream,
    #[strum(serialize = "meraki_ap_port_bandwidth_total_kbps")]
    ApPortBandwidthTotal,
    #[strum(serialize = "meraki_ap_port_bandwidth_upstream_kbps")]
    ApPortBandwidthUpstream,
    #[strum(serialize = "meraki_ap_port_bandwidth_downstream_kbps")]
    ApPortBandwidthDownstream,

    // ── Wireless / system ──
    #[strum(serialize = "meraki_wireless_client_count")]
    WirelessClientCount,
    #[strum(serialize = "meraki_wireless_ap_cpu_load_percent")]
    WirelessApCpuLoad,
    #[strum(serialize = "meraki_device_memory_used_percent")]
    MemoryUsedPercent,
    #[strum(serialize = "meraki_device_floor")]
    Floor,
}

impl Family {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::DeviceLatency => "The latency of the Meraki device in seconds",
            Self::DeviceLossPercent => "The packet loss percentage of the Meraki device",
            Self::DeviceStatus => "The status of the Meraki device (1 for online, 0 for offline)",
            Self::CellularFailover => {
                "Whether the Meraki device is using cellular failover (1 for true, 0 for false)"
            }
            Self::UplinkStatus => {
                "The status of the uplink of the Meraki device \
                 (0 active, 1 ready, 2 connecting, 3 not connected, 4 failed)"
            }
            Self::MissingData => {
                "Whether the device was only reported by a secondary feed (1 for true, 0 for false)"
            }
            Self::VpnMode => "The VPN mode of the Meraki device (1 for hub, 0 for spoke)",
            Self::VpnExportedSubnets => "The exported subnets of the Meraki VPN",
            Self::VpnMerakiPeers => "The Meraki VPN peers of the Meraki VPN (1 for reachable)",
            Self::VpnThirdPartyPeers => {
                "The third-party VPN peers of the Meraki VPN (1 for reachable)"
            }
            Self::SwitchPortUsageTotal => "Total data usage on switch port in bytes",
            Self::SwitchPortUsageUpstream => "Upstream data usage on switch port in bytes",
            Self::SwitchPortUsageDownstream => "Downstream data usage on switch port in bytes",
            Self::SwitchPortBandwidthTotal => "Total bandwidth usage on switch port in kbps",
            Self::SwitchPortBandwidthUpstream => "Upstream bandwidth usage on switch port in kbps",
            Self::SwitchPortBandwidthDownstream => {
                "Downstream bandwidth usage on switch port in kbps"
            }
            Self::ApPortUsageTotal => "Total data usage on access point switch port in bytes",
            Self::ApPortUsageUpstream => {
                "Upstream data usage on access point switch port in bytes"
            }
            Self::ApPortUsageDownstream => {
                "Downstream data usage on access point switch port in bytes"
            }
            Self::ApPortBandwidthTotal => {
                "Total bandwidth usage on access point switch port in kbps"
            }
            Self::ApPortBandwidthUpstream => {
                "Upstream bandwidth usage on access point switch port in kbps"
            }
            Self::ApPortBandwidthDownstream => {
                "Downstream bandwidth usage on access point switch port in kbps"
            }
            Self::WirelessClientCount => "Number of clients connected to the access point",
            Self::WirelessApCpuLoad => "CPU load of the access point in percent of all cores",
            Self::MemoryUsedPercent => "Peak memory usage of the device in percent",
            Self::Floor => "Floor plan the device is placed on (always 1)",
        }
    }

    /// Labels after the device labels.
    pub fn extra_labels(self) -> &'static [&'static str] {
        match self {
            Self::UplinkStatus => &["uplink"],
            Self::VpnExportedSubnets => &["subnet"],
            Self::VpnMerakiPeers => &["peer_networkId", "peer_networkName", "reachability"],
            Self::VpnThirdPartyPeers => &["peer_name", "peer_publicIp", "reachability"],
            Self::SwitchPortUsageTotal
            | Self::SwitchPortUsageUpstream
            | Self::SwitchPortUsageDownstream
            | Self::SwitchPortBandwidthTotal
            | Self::SwitchPortBandwidthUpstream
            | Self::SwitchPortBandwidthDownstream => &["portId"],
            Self::ApPortUsageTotal
            | Self::ApPortUsageUpstream
            | Self::ApPortUsageDownstream
            | Self::ApPortBandwidthTotal
            | Self::ApPortBandwidthUpstream
            | Self::ApPortBandwidthDownstream => &["portId", "apName"],
            Self::Floor => &["floorName"],
            _ => &[],
        }
    }

    /// Whether the family is part of the output for these collection options.
    pub fn is_enabled(self, options: CollectOptions) -> bool {
        match self {
            Self::VpnMode
            | Self::VpnExportedSubnets
            | Self::VpnMerakiPeers
            | Self::VpnThirdPartyPeers => options.vpn,
            Self::SwitchPortUsageTotal
            | Self::SwitchPortUsageUpstream
            | Self::SwitchPortUsageDownstream
            | Self::ApPortUsageTotal
            | Self::ApPortUsageUpstream
            | Self::ApPortUsageDownstream => options.port_usage_bytes,
            Self::Floor => options.floor_plans,
            _ => true,
        }
    }
}

/// The six families one switch port feeds.
struct PortFamilies {
    usage: [Family; 3],
    bandwidth: [Family; 3],
}

const SWITCH_PORT: PortFamilies = PortFamilies {
    usage: [
        Family::SwitchPortUsageTotal,
        Family::SwitchPortUsageUpstream,
        Family::SwitchPortUsageDownstream,
    ],
    bandwidth: [
        Family::SwitchPortBandwidthTotal,
        Family::SwitchPortBandwidthUpstream,
        Family::SwitchPortBandwidthDownstream,
    ],
};

const AP_PORT: PortFamilies = PortFamilies {
    usage: [
        Family::ApPortUsageTotal,
        Family::ApPortUsageUpstream,
        Family::ApPortUsageDownstream,
    ],
    bandwidth: [
        Family::ApPortBandwidthTotal,
        Family::ApPortBandwidthUpstream,
        Family::ApPortBandwidthDownstream,
    ],
};

// ── Builder ─────────────────────────────────────────────────────────

/// The registry of one scrape.
pub struct Exposition {
    registry: Registry,
    org_id: String,
    gauges: HashMap<Family, GaugeVec>,
    processing: Gauge,
}

impl Exposition {
    /// Register every family enabled by `options`.
    pub fn new(org_id: impl Into<String>, options: CollectOptions) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();

        for family in Family::iter().filter(|f| f.is_enabled(options)) {
            let labels: Vec<&str> = DEVICE_LABELS
                .iter()
                .chain(family.extra_labels())
                .copied()
                .collect();
            let gauge = GaugeVec::new(Opts::new(family.name(), family.help()), &labels)?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(family, gauge);
        }

        let processing = Gauge::new(
            "request_processing_seconds",
            "Time spent collecting and rendering the scrape",
        )?;
        registry.register(Box::new(processing.clone()))?;

        Ok(Self {
            registry,
            org_id: org_id.into(),
            gauges,
            processing,
        })
    }

    pub fn push_devices<'a>(&self, devices: impl IntoIterator<Item = &'a DeviceRecord>) {
        for device in devices {
            self.push_device(device);
        }
    }

    /// Record every sample one device contributes.
    pub fn push_device(&self, device: &DeviceRecord) {
        let name = [device.name.as_deref(), device.mac.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .unwrap_or(&device.serial);
        let target = [
            device.serial.as_str(),
            name,
            device.network_name.as_deref().unwrap_or_default(),
            device.org_name.as_deref().unwrap_or_default(),
            self.org_id.as_str(),
        ];

        if let Some(ms) = device.latency_ms {
            self.set(Family::DeviceLatency, &target, &[], ms / 1000.0);
        }
        if let Some(loss) = device.loss_percent {
            self.set(Family::DeviceLossPercent, &target, &[], loss);
        }
        if device.status.is_some() {
            self.set(Family::DeviceStatus, &target, &[], flag(device.is_online()));
        }
        if let Some(failover) = device.using_cellular_failover {
            self.set(Family::CellularFailover, &target, &[], flag(failover));
        }
        for (interface, status) in &device.uplinks {
            if let Some(code) = status.code() {
                self.set(Family::UplinkStatus, &target, &[interface.as_str()], f64::from(code));
            }
        }
        self.set(Family::MissingData, &target, &[], flag(device.missing_data));

        self.push_vpn(&target, device);

        for (port_id, usage) in &device.switch_port_usage {
            self.push_port(&target, port_id, usage);
        }

        if let Some(count) = device.wireless_client_count {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            let count = count as f64;
            self.set(Family::WirelessClientCount, &target, &[], count);
        }
        if let Some(load) = device.wireless_ap_cpu_load_percent {
            self.set(Family::WirelessApCpuLoad, &target, &[], load);
        }
        if let Some(memory) = device.memory_used_percent {
            self.set(Family::MemoryUsedPercent, &target, &[], memory);
        }
        if let Some(ref floor) = device.floor_name {
            self.set(Family::Floor, &target, &[floor.as_str()], 1.0);
        }
    }

    fn push_vpn(&self, target: &[&str], device: &DeviceRecord) {
        if let Some(mode) = device.vpn_mode {
            self.set(Family::VpnMode, target, &[], flag(mode == VpnMode::Hub));
        }
        for subnet in &device.exported_subnets {
            self.set(Family::VpnExportedSubnets, target, &[subnet.as_str()], 1.0);
        }
        for peer in &device.meraki_vpn_peers {
            self.set(
                Family::VpnMerakiPeers,
                target,
                &[
                    peer.network_id.as_str(),
                    peer.network_name.as_str(),
                    peer.reachability.as_ref(),
                ],
                flag(peer.reachability.is_reachable()),
            );
        }
        for peer in &device.third_party_vpn_peers {
            self.set(
                Family::VpnThirdPartyPeers,
                target,
                &[
                    peer.name.as_str(),
                    peer.public_ip.as_str(),
                    peer.reachability.as_ref(),
                ],
                flag(peer.reachability.is_reachable()),
            );
        }
    }

    fn push_port(&self, target: &[&str], port_id: &str, usage: &PortUsageRecord) {
        let (families, extra): (&PortFamilies, Vec<&str>) = match usage.ap_device_name.as_deref() {
            Some(ap_name) => (&AP_PORT, vec![port_id, ap_name]),
            None => (&SWITCH_PORT, vec![port_id]),
        };

        let bytes = [
            usage.usage_total_bytes,
            usage.usage_upstream_bytes,
            usage.usage_downstream_bytes,
        ];
        for (family, value) in families.usage.into_iter().zip(bytes) {
            if let Some(value) = value {
                self.set(family, target, &extra, value);
            }
        }

        let kbps = [
            usage.bandwidth_total_kbps,
            usage.bandwidth_upstream_kbps,
            usage.bandwidth_downstream_kbps,
        ];
        for (family, value) in families.bandwidth.into_iter().zip(kbps) {
            self.set(family, target, &extra, value);
        }
    }

    /// Set one sample; families disabled for this scrape are skipped.
    fn set(&self, family: Family, target: &[&str], extra: &[&str], value: f64) {
        let Some(gauge) = self.gauges.get(&family) else {
            return;
        };
        let values: Vec<&str> = target
            .iter()
            .copied()
            .chain(extra.iter().copied())
            .collect();
        match gauge.get_metric_with_label_values(&values) {
            Ok(sample) => sample.set(value),
            Err(e) => warn!(family = family.name(), error = %e, "dropping sample"),
        }
    }

    /// Record the processing time and encode the registry.
    pub fn finish(self, elapsed: Duration) -> prometheus::Result<String> {
        self.processing.set(elapsed.as_secs_f64());

        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn flag(value: bool) -> f64 {
    f64::from(u8::from(value))
}
