// meraki-api: Async Rust client for the Meraki Dashboard API

pub mod dashboard;
pub mod error;
pub mod transport;

pub use dashboard::client::DashboardClient;
pub use dashboard::listing::Listing;
pub use dashboard::models;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
