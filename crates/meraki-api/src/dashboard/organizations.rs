// Organization-scoped endpoints
//
// Everything here is addressed as `/organizations/{organizationId}/...`,
// except the organization listing itself.

use serde_json::Value;
use tracing::debug;

use crate::dashboard::client::DashboardClient;
use crate::dashboard::models::{
    DeviceAvailability, MemoryUsageHistory, Network, Organization, UplinkLossLatency,
};
use crate::error::Error;

impl DashboardClient {
    /// List every organization the API key can see.
    ///
    /// `GET /organizations`
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, Error> {
        debug!("listing organizations");
        self.get_all("organizations", &[]).await
    }

    /// `GET /organizations/{org}`
    pub async fn get_organization(&self, org_id: &str) -> Result<Organization, Error> {
        self.get(&format!("organizations/{org_id}"), &[]).await
    }

    /// Top devices by usage; used as a cheap access probe for an organization.
    ///
    /// `GET /organizations/{org}/summary/top/devices/byUsage`
    pub async fn top_devices_by_usage(&self, org_id: &str) -> Result<Vec<Value>, Error> {
        self.get(&format!("organizations/{org_id}/summary/top/devices/byUsage"), &[])
            .await
    }

    /// `GET /organizations/{org}/devices/availabilities` (all pages)
    pub async fn list_device_availabilities(
        &self,
        org_id: &str,
    ) -> Result<Vec<DeviceAvailability>, Error> {
        self.get_all(&format!("organizations/{org_id}/devices/availabilities"), &[])
            .await
    }

    /// Loss and latency samples towards `probe_ip` for every MX/Z uplink.
    ///
    /// `GET /organizations/{org}/devices/uplinksLossAndLatency?ip=..&timespan=..`
    pub async fn list_uplinks_loss_and_latency(
        &self,
        org_id: &str,
        probe_ip: &str,
        timespan_secs: u64,
    ) -> Result<Vec<UplinkLossLatency>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/devices/uplinksLossAndLatency"),
            &[
                ("ip", probe_ip.to_owned()),
                ("timespan", timespan_secs.to_string()),
            ],
        )
        .await
    }

    /// `GET /organizations/{org}/devices/system/memory/usage/history/byInterval`
    pub async fn list_memory_usage_history(
        &self,
        org_id: &str,
        timespan_secs: u64,
        interval_secs: u64,
    ) -> Result<Vec<MemoryUsageHistory>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/devices/system/memory/usage/history/byInterval"),
            &[
                ("timespan", timespan_secs.to_string()),
                ("interval", interval_secs.to_string()),
            ],
        )
        .await
    }

    /// `GET /organizations/{org}/networks` (all pages)
    pub async fn list_networks(&self, org_id: &str) -> Result<Vec<Network>, Error> {
        self.get_all(&format!("organizations/{org_id}/networks"), &[])
            .await
    }
}
