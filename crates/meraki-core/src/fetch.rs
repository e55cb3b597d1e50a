// Per-source fetchers
//
// One async function per Dashboard data category. Each borrows the shared
// client, returns an owned value, and never looks at another source's
// output. Which failures are fatal is decided by the collector, not here.

use std::collections::HashMap;

use futures_util::future::join_all;
use meraki_api::DashboardClient;
use meraki_api::models::{
    ApplianceUplinkStatus, DeviceAvailability, FloorPlan, MemoryUsageHistory, Network,
    Organization, SwitchPortStatuses, SwitchPortTopology, SwitchPortUsageHistory, SwitchPorts,
    UplinkLossLatency, VpnStatus, WirelessClientOverview, WirelessCpuLoad,
};
use tracing::{debug, info, warn};

use crate::classify::discovered_neighbor;
use crate::error::CoreError;
use crate::model::{DiscoveredNeighbor, PortMap};

/// Product type that marks a network as carrying access points.
const WIRELESS_PRODUCT: &str = "wireless";

// ── Inventory & health ──────────────────────────────────────────────

pub async fn devices(
    client: &DashboardClient,
    org_id: &str,
) -> Result<Vec<DeviceAvailability>, CoreError> {
    let rows = client.list_device_availabilities(org_id).await?;
    info!(org_id, count = rows.len(), "fetched devices");
    Ok(rows)
}

pub async fn loss_and_latency(
    client: &DashboardClient,
    org_id: &str,
    probe_ip: &str,
    timespan_secs: u64,
) -> Result<Vec<UplinkLossLatency>, CoreError> {
    let rows = client
        .list_uplinks_loss_and_latency(org_id, probe_ip, timespan_secs)
        .await?;
    info!(org_id, count = rows.len(), "fetched uplink loss and latency");
    Ok(rows)
}

pub async fn uplink_statuses(
    client: &DashboardClient,
    org_id: &str,
) -> Result<Vec<ApplianceUplinkStatus>, CoreError> {
    let rows = client.list_appliance_uplink_statuses(org_id).await?;
    info!(org_id, count = rows.len(), "fetched uplink statuses");
    Ok(rows)
}

pub async fn vpn_statuses(
    client: &DashboardClient,
    org_id: &str,
) -> Result<Vec<VpnStatus>, CoreError> {
    let rows = client.list_appliance_vpn_statuses(org_id).await?;
    info!(org_id, count = rows.len(), "fetched VPN statuses");
    Ok(rows)
}

pub async fn organization(
    client: &DashboardClient,
    org_id: &str,
) -> Result<Organization, CoreError> {
    client.get_organization(org_id).await.map_err(|e| {
        if e.is_not_found() {
            CoreError::OrganizationNotFound {
                org_id: org_id.to_owned(),
            }
        } else {
            e.into()
        }
    })
}

pub async fn organizations(client: &DashboardClient) -> Result<Vec<Organization>, CoreError> {
    let orgs = client.list_organizations().await?;
    debug!(count = orgs.len(), "fetched organizations");
    Ok(orgs)
}

pub async fn memory_usage(
    client: &DashboardClient,
    org_id: &str,
    timespan_secs: u64,
    interval_secs: u64,
) -> Result<Vec<MemoryUsageHistory>, CoreError> {
    let rows = client
        .list_memory_usage_history(org_id, timespan_secs, interval_secs)
        .await?;
    info!(org_id, count = rows.len(), "fetched memory usage");
    Ok(rows)
}

// ── Switch ports ────────────────────────────────────────────────────

/// Port usage history, keeping only switches with at least one sampled port.
pub async fn switch_port_usage(
    client: &DashboardClient,
    org_id: &str,
    timespan_secs: u64,
) -> Result<Vec<SwitchPortUsageHistory>, CoreError> {
    let rows = client
        .list_switch_port_usage_history(org_id, timespan_secs)
        .await?;
    let returned = rows.len();
    let rows: Vec<_> = rows
        .into_iter()
        .filter(SwitchPortUsageHistory::has_interval_data)
        .collect();
    info!(
        org_id,
        returned,
        with_data = rows.len(),
        "fetched switch port usage"
    );
    Ok(rows)
}

pub async fn switch_port_tags(
    client: &DashboardClient,
    org_id: &str,
) -> Result<PortMap<Vec<String>>, CoreError> {
    let map = tag_map(client.list_switch_ports_by_switch(org_id).await?);
    let uplinks = map
        .iter()
        .filter(|(_, _, tags)| tags.iter().any(|t| t == "uplink"))
        .count();
    info!(
        org_id,
        switches = map.device_count(),
        tagged_ports = map.len(),
        uplinks,
        "fetched switch port tags"
    );
    Ok(map)
}

pub async fn switch_port_statuses(
    client: &DashboardClient,
    org_id: &str,
) -> Result<PortMap<String>, CoreError> {
    let map = status_map(client.list_switch_port_statuses(org_id).await?);
    info!(org_id, ports = map.len(), "fetched switch port statuses");
    Ok(map)
}

pub async fn switch_port_topology(
    client: &DashboardClient,
    org_id: &str,
) -> Result<PortMap<DiscoveredNeighbor>, CoreError> {
    let map = discovery_map(client.list_switch_port_topology(org_id).await?);
    info!(org_id, neighbors = map.len(), "fetched switch port topology");
    Ok(map)
}

// ── Wireless ────────────────────────────────────────────────────────

pub async fn wireless_client_counts(
    client: &DashboardClient,
    org_id: &str,
) -> Result<Vec<WirelessClientOverview>, CoreError> {
    let rows = client.list_wireless_client_overview(org_id).await?;
    info!(org_id, count = rows.len(), "fetched wireless client counts");
    Ok(rows)
}

pub async fn wireless_cpu_load(
    client: &DashboardClient,
    org_id: &str,
    timespan_secs: u64,
) -> Result<Vec<WirelessCpuLoad>, CoreError> {
    let rows = client
        .list_wireless_cpu_load_history(org_id, timespan_secs)
        .await?;
    info!(org_id, count = rows.len(), "fetched wireless CPU load");
    Ok(rows)
}

// ── Networks & floor plans ──────────────────────────────────────────

pub async fn networks(client: &DashboardClient, org_id: &str) -> Result<Vec<Network>, CoreError> {
    let rows = client.list_networks(org_id).await?;
    info!(org_id, count = rows.len(), "fetched networks");
    Ok(rows)
}

/// Floor name per device serial, across every wireless network.
///
/// Networks are queried concurrently; a failing network is logged and
/// skipped.
pub async fn floor_plans(client: &DashboardClient, networks: &[Network]) -> HashMap<String, String> {
    let wireless: Vec<&Network> = networks
        .iter()
        .filter(|n| !n.id.is_empty() && n.has_product(WIRELESS_PRODUCT))
        .collect();

    let results = join_all(
        wireless
            .iter()
            .map(|network| client.list_floor_plans(&network.id)),
    )
    .await;

    let mut plans = Vec::new();
    for (network, result) in wireless.iter().zip(results) {
        match result {
            Ok(mut rows) => plans.append(&mut rows),
            Err(e) => warn!(network_id = %network.id, error = %e, "floor plans unavailable"),
        }
    }

    let map = floor_map(plans);
    info!(networks = wireless.len(), devices = map.len(), "fetched floor plans");
    map
}

// ── Map builders ────────────────────────────────────────────────────

/// `serial -> port -> tags`, ports without tags omitted.
pub fn tag_map(switches: Vec<SwitchPorts>) -> PortMap<Vec<String>> {
    let mut map = PortMap::new();
    for switch in switches {
        let Some(serial) = switch.serial.filter(|s| !s.is_empty()) else {
            continue;
        };
        for port in switch.ports {
            if !port.tags.is_empty() {
                map.insert(serial.clone(), port.port_id, port.tags);
            }
        }
    }
    map
}

/// `serial -> port -> link status`, ports without status omitted.
pub fn status_map(switches: Vec<SwitchPortStatuses>) -> PortMap<String> {
    let mut map = PortMap::new();
    for switch in switches {
        let Some(serial) = switch.serial.filter(|s| !s.is_empty()) else {
            continue;
        };
        for port in switch.ports {
            if let Some(status) = port.status {
                map.insert(serial.clone(), port.port_id, status);
            }
        }
    }
    map
}

/// `serial -> port -> Meraki neighbor`, non-Meraki neighbors omitted.
pub fn discovery_map(switches: Vec<SwitchPortTopology>) -> PortMap<DiscoveredNeighbor> {
    let mut map = PortMap::new();
    for switch in switches {
        let Some(serial) = switch.serial.filter(|s| !s.is_empty()) else {
            continue;
        };
        for port in switch.ports {
            if let Some(neighbor) = discovered_neighbor(&port.cdp, &port.lldp) {
                map.insert(serial.clone(), port.port_id, neighbor);
            }
        }
    }
    map
}

/// `serial -> floor name`; the first plan listing a device wins.
pub fn floor_map(plans: Vec<FloorPlan>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for plan in plans {
        let Some(name) = plan.name.filter(|n| !n.is_empty()) else {
            continue;
        };
        for serial in plan.devices.into_iter().filter_map(|d| d.serial) {
            map.entry(serial).or_insert_with(|| name.clone());
        }
    }
    map
}
