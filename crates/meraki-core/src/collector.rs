// ── Collector ──
//
// Entry point of the core. One `collect()` call fans every source out with
// `tokio::join!`, degrades the optional ones to empty on failure, and hands
// the owned results to the merge.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use meraki_api::models::Organization;
use meraki_api::{DashboardClient, TlsMode, TransportConfig};
use tracing::{debug, error, info, warn};

use crate::config::{CollectOptions, CollectorConfig, Timespans, TlsVerification};
use crate::error::CoreError;
use crate::fetch;
use crate::merge::{SourceData, merge};
use crate::model::{DeviceMap, PortClassificationMaps};

/// Name lookups produced by the networks worker.
#[derive(Debug)]
struct NetworkLookups {
    network_names: HashMap<String, String>,
    floor_names: HashMap<String, String>,
}

/// Collects and reconciles one organization's devices on demand.
///
/// Cheap to clone; every clone shares the same HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Collector {
    client: DashboardClient,
    options: CollectOptions,
    timespans: Timespans,
    probe_ip: String,
    fetch_timeout: Duration,
}

impl Collector {
    /// Build a collector with its own authenticated Dashboard client.
    pub fn new(config: &CollectorConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = DashboardClient::from_api_key(&config.base_url, &config.api_key, &transport)?;
        Ok(Self::from_client(client, config))
    }

    /// Use an existing client; the config's key, URL and transport settings
    /// are ignored.
    pub fn from_client(client: DashboardClient, config: &CollectorConfig) -> Self {
        Self {
            client,
            options: config.collect,
            timespans: config.timespans,
            probe_ip: config.probe_ip.clone(),
            fetch_timeout: config.fetch_timeout,
        }
    }

    pub fn options(&self) -> &CollectOptions {
        &self.options
    }

    // ── Collection ───────────────────────────────────────────────────

    /// Fetch every source for `org_id` and merge them into a device map.
    ///
    /// Fails only when switch port usage or switch port tags cannot be
    /// fetched; every other source degrades to empty.
    pub async fn collect(&self, org_id: &str) -> Result<DeviceMap, CoreError> {
        let started = Instant::now();
        let client = &self.client;
        let spans = &self.timespans;
        info!(org_id, "starting collection");

        let (
            organization,
            devices,
            loss_and_latency,
            uplink_statuses,
            vpn_statuses,
            port_usage,
            port_tags,
            port_statuses,
            port_topology,
            client_counts,
            cpu_load,
            memory_usage,
            lookups,
        ) = tokio::join!(
            self.bounded(fetch::organization(client, org_id)),
            self.bounded(fetch::devices(client, org_id)),
            self.bounded(fetch::loss_and_latency(
                client,
                org_id,
                &self.probe_ip,
                spans.loss_latency,
            )),
            self.bounded(fetch::uplink_statuses(client, org_id)),
            async {
                if self.options.vpn {
                    self.bounded(fetch::vpn_statuses(client, org_id)).await
                } else {
                    Ok(Vec::new())
                }
            },
            self.bounded(fetch::switch_port_usage(client, org_id, spans.port_usage)),
            self.bounded(fetch::switch_port_tags(client, org_id)),
            self.bounded(fetch::switch_port_statuses(client, org_id)),
            self.bounded(fetch::switch_port_topology(client, org_id)),
            self.bounded(fetch::wireless_client_counts(client, org_id)),
            self.bounded(fetch::wireless_cpu_load(client, org_id, spans.cpu_load)),
            self.bounded(fetch::memory_usage(
                client,
                org_id,
                spans.memory,
                spans.memory_interval,
            )),
            self.network_lookups(org_id),
        );

        // Required sources -- failure aborts the scrape
        let switch_port_usage = required("switch_port_usage", port_usage)?;
        let tags = required("switch_port_tags", port_tags)?;

        // Everything else degrades to empty
        let data = SourceData {
            organization: recover("organization", organization.map(Some)),
            devices: recover("devices", devices),
            loss_and_latency: recover("loss_and_latency", loss_and_latency),
            uplink_statuses: recover("uplink_statuses", uplink_statuses),
            vpn_statuses: recover("vpn_statuses", vpn_statuses),
            switch_port_usage,
            port_maps: PortClassificationMaps {
                tags,
                discovery: recover("switch_port_topology", port_topology),
                status: recover("switch_port_statuses", port_statuses),
            },
            wireless_client_counts: recover("wireless_client_counts", client_counts),
            wireless_cpu_load: recover("wireless_cpu_load", cpu_load),
            memory_usage: recover("memory_usage", memory_usage),
            network_names: lookups.network_names,
            floor_names: lookups.floor_names,
        };

        let devices = merge(data, &self.options);
        info!(
            org_id,
            devices = devices.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "collection complete"
        );
        Ok(devices)
    }

    /// Network names, plus floor-plan names when enabled.
    ///
    /// The networks call and the floor-plan fan-out are bounded separately;
    /// either one degrades to empty without losing the other.
    async fn network_lookups(&self, org_id: &str) -> NetworkLookups {
        let networks = recover(
            "networks",
            self.bounded(fetch::networks(&self.client, org_id)).await,
        );

        let floor_names = if self.options.floor_plans {
            let plans = async {
                Ok::<_, CoreError>(fetch::floor_plans(&self.client, &networks).await)
            };
            recover("floor_plans", self.bounded(plans).await)
        } else {
            HashMap::new()
        };

        let network_names = networks
            .into_iter()
            .filter(|n| !n.id.is_empty())
            .filter_map(|n| Some((n.id, n.name?)))
            .collect();
        NetworkLookups {
            network_names,
            floor_names,
        }
    }

    // ── Organizations ────────────────────────────────────────────────

    /// Every organization visible to the API key.
    pub async fn organizations(&self) -> Result<Vec<Organization>, CoreError> {
        self.bounded(fetch::organizations(&self.client)).await
    }

    /// Organizations whose monitoring endpoints the key can actually read.
    ///
    /// Each visible organization is probed concurrently; those that reject
    /// the probe are dropped.
    pub async fn accessible_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        let orgs = self.organizations().await?;
        let probes = join_all(
            orgs.iter()
                .map(|org| self.client.top_devices_by_usage(&org.id)),
        )
        .await;

        let accessible: Vec<Organization> = orgs
            .into_iter()
            .zip(probes)
            .filter_map(|(org, probe)| match probe {
                Ok(_) => Some(org),
                Err(e) => {
                    debug!(org_id = %org.id, error = %e, "organization not accessible");
                    None
                }
            })
            .collect();
        info!(count = accessible.len(), "accessible organizations");
        Ok(accessible)
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Bound a fetch by the configured per-source timeout.
    async fn bounded<T>(
        &self,
        fetch: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .unwrap_or_else(|_| {
                Err(CoreError::Timeout {
                    timeout_secs: self.fetch_timeout.as_secs(),
                })
            })
    }
}

fn build_transport(config: &CollectorConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        max_retries: config.max_retries,
        ..TransportConfig::default()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
    }
}

/// Degrade an optional source to its empty value.
fn recover<T: Default>(source: &str, result: Result<T, CoreError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(source, error = %e, "source unavailable, treating as empty");
            T::default()
        }
    }
}

/// Propagate a required source's failure.
fn required<T>(source: &'static str, result: Result<T, CoreError>) -> Result<T, CoreError> {
    result.map_err(|e| {
        error!(source, error = %e, "required source failed, aborting collection");
        CoreError::source_failed(source, &e)
    })
}

#[cfg(test)]
mod tests {
    use super::{recover, required};
    use crate::error::CoreError;

    #[test]
    fn recover_yields_default_on_error() {
        let failed: Result<Vec<u32>, CoreError> = Err(CoreError::Timeout { timeout_secs: 1 });
        assert!(recover("devices", failed).is_empty());
        assert_eq!(recover("devices", Ok(vec![1, 2])), vec![1, 2]);
    }

    #[test]
    fn required_wraps_the_source_name() {
        let failed: Result<(), CoreError> = Err(CoreError::Internal("boom".into()));
        match required("switch_port_tags", failed) {
            Err(CoreError::SourceFailed { source_name, .. }) => {
                assert_eq!(source_name, "switch_port_tags");
            }
            other => panic!("expected SourceFailed, got {other:?}"),
        }
    }
}
