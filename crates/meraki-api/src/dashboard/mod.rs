// Dashboard API client
//
// `client` owns transport mechanics (auth header, retries, pagination,
// envelope handling). Endpoint groups are inherent methods on
// `DashboardClient`, split by product area the way the Dashboard API
// documentation groups them.

pub mod appliance;
pub mod client;
pub mod listing;
pub mod models;
pub mod networks;
pub mod organizations;
pub mod switch;
pub mod wireless;
