// Wireless (MR) endpoints

use crate::dashboard::client::DashboardClient;
use crate::dashboard::models::{WirelessClientOverview, WirelessCpuLoad};
use crate::error::Error;

impl DashboardClient {
    /// `GET /organizations/{org}/wireless/clients/overview/byDevice`
    pub async fn list_wireless_client_overview(
        &self,
        org_id: &str,
    ) -> Result<Vec<WirelessClientOverview>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/wireless/clients/overview/byDevice"),
            &[],
        )
        .await
    }

    /// `GET /organizations/{org}/wireless/devices/system/cpu/load/history?timespan=..`
    pub async fn list_wireless_cpu_load_history(
        &self,
        org_id: &str,
        timespan_secs: u64,
    ) -> Result<Vec<WirelessCpuLoad>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/wireless/devices/system/cpu/load/history"),
            &[("timespan", timespan_secs.to_string())],
        )
        .await
    }
}
