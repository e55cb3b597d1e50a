// ── Multi-pass merge ──
//
// Folds every source's rows into one `DeviceRecord` per serial. Pass order
// is fixed: stub-creating passes (latency, uplinks, VPN, port usage) run
// before the enrichment passes that only touch devices already present.

use std::collections::HashMap;

use meraki_api::models::{
    ApplianceUplinkStatus, DeviceAvailability, MemoryUsageHistory, Organization,
    PortUsageInterval, SwitchPortUsageHistory, UplinkLossLatency, VpnStatus,
    WirelessClientOverview, WirelessCpuLoad,
};
use tracing::{debug, info};

use crate::config::CollectOptions;
use crate::derived::{kilobytes_to_bytes, normalize_cpu_load};
use crate::model::{
    DeviceMap, DeviceRecord, MerakiVpnPeer, PortClassificationMaps, PortUsageRecord,
    Reachability, ThirdPartyVpnPeer, UplinkStatus,
};

/// Everything the fetchers returned for one organization.
///
/// A source that failed is simply left at its default (empty).
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub organization: Option<Organization>,
    pub devices: Vec<DeviceAvailability>,
    pub loss_and_latency: Vec<UplinkLossLatency>,
    pub uplink_statuses: Vec<ApplianceUplinkStatus>,
    pub vpn_statuses: Vec<VpnStatus>,
    pub switch_port_usage: Vec<SwitchPortUsageHistory>,
    pub port_maps: PortClassificationMaps,
    pub wireless_client_counts: Vec<WirelessClientOverview>,
    pub wireless_cpu_load: Vec<WirelessCpuLoad>,
    pub memory_usage: Vec<MemoryUsageHistory>,
    /// Network id -> network name.
    pub network_names: HashMap<String, String>,
    /// Device serial -> floor plan name.
    pub floor_names: HashMap<String, String>,
}

/// The device map under construction.
#[derive(Debug, Default)]
pub struct DeviceIndex {
    devices: DeviceMap,
    stubs: usize,
}

impl DeviceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a device from the primary inventory.
    pub fn seed(&mut self, record: DeviceRecord) {
        self.devices.insert(record.serial.clone(), record);
    }

    /// The record for `serial`, inserting a `missing_data` stub when the
    /// inventory never mentioned it.
    pub fn entry_or_stub(&mut self, serial: &str) -> &mut DeviceRecord {
        let stubs = &mut self.stubs;
        self.devices.entry(serial.to_owned()).or_insert_with(|| {
            debug!(serial, "device missing from inventory, adding stub");
            *stubs += 1;
            DeviceRecord::stub(serial)
        })
    }

    /// The record for `serial`, only if it already exists.
    pub fn existing(&mut self, serial: &str) -> Option<&mut DeviceRecord> {
        self.devices.get_mut(serial)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn into_map(self) -> DeviceMap {
        self.devices
    }
}

/// Merge one collection cycle into a device map.
pub fn merge(data: SourceData, options: &CollectOptions) -> DeviceMap {
    let SourceData {
        organization,
        devices,
        loss_and_latency,
        uplink_statuses,
        vpn_statuses,
        switch_port_usage,
        port_maps,
        wireless_client_counts,
        wireless_cpu_load,
        memory_usage,
        network_names,
        floor_names,
    } = data;

    let org_name = organization.and_then(|o| o.name);
    let mut index = DeviceIndex::new();

    seed_inventory(
        &mut index,
        devices,
        org_name.as_deref(),
        &network_names,
        &floor_names,
    );
    let seeded = index.len();

    apply_loss_and_latency(&mut index, loss_and_latency);
    apply_uplink_statuses(&mut index, uplink_statuses);
    if options.vpn {
        apply_vpn_statuses(&mut index, vpn_statuses);
    }
    apply_switch_port_usage(&mut index, switch_port_usage, &port_maps, options);

    apply_wireless_client_counts(&mut index, wireless_client_counts);
    apply_wireless_cpu_load(&mut index, wireless_cpu_load);
    apply_memory_usage(&mut index, memory_usage);

    info!(
        seeded,
        stubs = index.stubs,
        total = index.len(),
        "merged device records"
    );
    index.into_map()
}

// ── Pass 1: inventory ───────────────────────────────────────────────

fn seed_inventory(
    index: &mut DeviceIndex,
    devices: Vec<DeviceAvailability>,
    org_name: Option<&str>,
    network_names: &HashMap<String, String>,
    floor_names: &HashMap<String, String>,
) {
    for device in devices {
        let Some(serial) = non_empty(device.serial.as_deref()) else {
            continue;
        };
        let network_name = device.network_id().map(|id| {
            network_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_owned())
        });

        let record = DeviceRecord {
            org_name: org_name.map(str::to_owned),
            name: first_non_empty(&[
                device.name.as_deref(),
                device.display_name.as_deref(),
                device.mac.as_deref(),
                Some(serial),
            ]),
            model: first_non_empty(&[device.model.as_deref(), device.product_type.as_deref()]),
            mac: owned_non_empty(device.mac.as_deref()),
            network_name,
            status: owned_non_empty(device.status.as_deref()),
            product_type: owned_non_empty(device.product_type.as_deref()),
            floor_name: floor_names.get(serial).cloned(),
            wan1_ip: owned_non_empty(device.wan1_ip.as_deref()),
            wan2_ip: owned_non_empty(device.wan2_ip.as_deref()),
            lan_ip: owned_non_empty(device.lan_ip.as_deref()),
            public_ip: owned_non_empty(device.public_ip.as_deref()),
            using_cellular_failover: device.using_cellular_failover,
            ..DeviceRecord::new(serial)
        };
        index.seed(record);
    }
}

// ── Passes 2-4: stub-creating appliance feeds ───────────────────────

fn apply_loss_and_latency(index: &mut DeviceIndex, rows: Vec<UplinkLossLatency>) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        let record = index.entry_or_stub(serial);
        // Most recent sample only
        if let Some(last) = row.time_series.last() {
            record.latency_ms = last.latency_ms;
            record.loss_percent = last.loss_percent;
        }
    }
}

fn apply_uplink_statuses(index: &mut DeviceIndex, rows: Vec<ApplianceUplinkStatus>) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        let record = index.entry_or_stub(serial);
        record.uplinks = row
            .uplinks
            .into_iter()
            .filter(|u| !u.interface.is_empty())
            .map(|u| {
                let status = UplinkStatus::from_wire(&u.status);
                (u.interface, status)
            })
            .collect();
    }
}

fn apply_vpn_statuses(index: &mut DeviceIndex, rows: Vec<VpnStatus>) {
    for row in rows {
        let Some(serial) = non_empty(row.device_serial.as_deref()) else {
            continue;
        };
        let record = index.entry_or_stub(serial);
        record.vpn_mode = row.vpn_mode.as_deref().and_then(|m| m.trim().parse().ok());
        record.exported_subnets = row
            .exported_subnets
            .into_iter()
            .map(|s| s.subnet)
            .filter(|s| !s.is_empty())
            .collect();
        record.meraki_vpn_peers = row
            .meraki_vpn_peers
            .into_iter()
            .map(|p| MerakiVpnPeer {
                reachability: Reachability::from_wire(p.reachability.as_deref()),
                network_id: p.network_id,
                network_name: p.network_name,
            })
            .collect();
        record.third_party_vpn_peers = row
            .third_party_vpn_peers
            .into_iter()
            .map(|p| ThirdPartyVpnPeer {
                reachability: Reachability::from_wire(p.reachability.as_deref()),
                name: p.name,
                public_ip: p.public_ip,
            })
            .collect();
    }
}

// ── Pass 5: switch ports ────────────────────────────────────────────

fn apply_switch_port_usage(
    index: &mut DeviceIndex,
    rows: Vec<SwitchPortUsageHistory>,
    maps: &PortClassificationMaps,
    options: &CollectOptions,
) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        let record = index.entry_or_stub(serial);
        for port in row.ports {
            let Some(latest) = port.intervals.last() else {
                continue;
            };
            let ap_device_name = maps.access_point(serial, &port.port_id);
            if ap_device_name.is_none() && !maps.is_uplink(serial, &port.port_id) {
                continue;
            }
            let usage = port_usage_record(latest, ap_device_name, options);
            record.switch_port_usage.insert(port.port_id, usage);
        }
    }
}

fn port_usage_record(
    interval: &PortUsageInterval,
    ap_device_name: Option<String>,
    options: &CollectOptions,
) -> PortUsageRecord {
    let data = interval
        .data
        .as_ref()
        .and_then(|d| d.usage)
        .unwrap_or_default();
    let bandwidth = interval
        .bandwidth
        .as_ref()
        .and_then(|b| b.usage)
        .unwrap_or_default();
    let bytes = |kb: Option<f64>| {
        options
            .port_usage_bytes
            .then(|| kilobytes_to_bytes(kb.unwrap_or(0.0)))
    };

    PortUsageRecord {
        usage_total_bytes: bytes(data.total),
        usage_upstream_bytes: bytes(data.upstream),
        usage_downstream_bytes: bytes(data.downstream),
        bandwidth_total_kbps: bandwidth.total.unwrap_or(0.0),
        bandwidth_upstream_kbps: bandwidth.upstream.unwrap_or(0.0),
        bandwidth_downstream_kbps: bandwidth.downstream.unwrap_or(0.0),
        ap_device_name,
    }
}

// ── Pass 6: enrichment (never creates records) ──────────────────────

fn apply_wireless_client_counts(index: &mut DeviceIndex, rows: Vec<WirelessClientOverview>) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        if let (Some(record), Some(online)) = (index.existing(serial), row.online_clients()) {
            record.wireless_client_count = Some(online);
        }
    }
}

fn apply_wireless_cpu_load(index: &mut DeviceIndex, rows: Vec<WirelessCpuLoad>) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        let Some(record) = index.existing(serial) else {
            continue;
        };
        let (Some(cores), Some(raw)) = (
            row.cpu_count,
            row.series.last().and_then(|s| s.cpu_load5),
        ) else {
            continue;
        };
        record.wireless_ap_cpu_load_percent = Some(normalize_cpu_load(cores, raw));
    }
}

fn apply_memory_usage(index: &mut DeviceIndex, rows: Vec<MemoryUsageHistory>) {
    for row in rows {
        let Some(serial) = non_empty(row.serial.as_deref()) else {
            continue;
        };
        let Some(record) = index.existing(serial) else {
            continue;
        };
        let used = row
            .intervals
            .last()
            .and_then(|i| i.memory.as_ref())
            .and_then(|m| m.used.as_ref())
            .and_then(|u| u.percentages.as_ref())
            .and_then(|p| p.maximum);
        if used.is_some() {
            record.memory_used_percent = used;
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn owned_non_empty(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_owned)
}

fn first_non_empty(candidates: &[Option<&str>]) -> Option<String> {
    candidates.iter().find_map(|c| owned_non_empty(*c))
}
