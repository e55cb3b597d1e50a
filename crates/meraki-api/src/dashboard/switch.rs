// Switch (MS) endpoints
//
// The organization-wide `bySwitch` / `byDevice` endpoints answer with an
// `items` envelope; `get_all` flattens it.

use crate::dashboard::client::DashboardClient;
use crate::dashboard::models::{
    SwitchPortStatuses, SwitchPortTopology, SwitchPortUsageHistory, SwitchPorts,
};
use crate::error::Error;

impl DashboardClient {
    /// Per-port usage and bandwidth, bucketed by interval.
    ///
    /// `GET /organizations/{org}/switch/ports/usage/history/byDevice/byInterval?timespan=..`
    pub async fn list_switch_port_usage_history(
        &self,
        org_id: &str,
        timespan_secs: u64,
    ) -> Result<Vec<SwitchPortUsageHistory>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/switch/ports/usage/history/byDevice/byInterval"),
            &[("timespan", timespan_secs.to_string())],
        )
        .await
    }

    /// Port configuration (including tags) for every switch.
    ///
    /// `GET /organizations/{org}/switch/ports/bySwitch`
    pub async fn list_switch_ports_by_switch(
        &self,
        org_id: &str,
    ) -> Result<Vec<SwitchPorts>, Error> {
        self.get_all(&format!("organizations/{org_id}/switch/ports/bySwitch"), &[])
            .await
    }

    /// Live link status for every switch port.
    ///
    /// `GET /organizations/{org}/switch/ports/statuses/bySwitch`
    pub async fn list_switch_port_statuses(
        &self,
        org_id: &str,
    ) -> Result<Vec<SwitchPortStatuses>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/switch/ports/statuses/bySwitch"),
            &[],
        )
        .await
    }

    /// CDP / LLDP neighbors seen on every switch port.
    ///
    /// `GET /organizations/{org}/switch/ports/topology/discovery/byDevice`
    pub async fn list_switch_port_topology(
        &self,
        org_id: &str,
    ) -> Result<Vec<SwitchPortTopology>, Error> {
        self.get_all(
            &format!("organizations/{org_id}/switch/ports/topology/discovery/byDevice"),
            &[],
        )
        .await
    }
}
