// Security appliance (MX / Z) endpoints

use crate::dashboard::client::DashboardClient;
use crate::dashboard::models::{ApplianceUplinkStatus, VpnStatus};
use crate::error::Error;

impl DashboardClient {
    /// `GET /organizations/{org}/appliance/uplink/statuses` (all pages)
    pub async fn list_appliance_uplink_statuses(
        &self,
        org_id: &str,
    ) -> Result<Vec<ApplianceUplinkStatus>, Error> {
        self.get_all(&format!("organizations/{org_id}/appliance/uplink/statuses"), &[])
            .await
    }

    /// `GET /organizations/{org}/appliance/vpn/statuses` (all pages)
    pub async fn list_appliance_vpn_statuses(
        &self,
        org_id: &str,
    ) -> Result<Vec<VpnStatus>, Error> {
        self.get_all(&format!("organizations/{org_id}/appliance/vpn/statuses"), &[])
            .await
    }
}
