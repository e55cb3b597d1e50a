// Network-scoped endpoints

use crate::dashboard::client::DashboardClient;
use crate::dashboard::models::FloorPlan;
use crate::error::Error;

impl DashboardClient {
    /// `GET /networks/{network}/floorPlans`
    pub async fn list_floor_plans(&self, network_id: &str) -> Result<Vec<FloorPlan>, Error> {
        self.get_all(&format!("networks/{network_id}/floorPlans"), &[])
            .await
    }
}
