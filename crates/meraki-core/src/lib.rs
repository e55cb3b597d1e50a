// meraki-core: Collection and reconciliation engine between meraki-api and the exporter.

pub mod classify;
pub mod collector;
pub mod config;
pub mod derived;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collector::Collector;
pub use config::{CollectOptions, CollectorConfig, Timespans, TlsVerification};
pub use error::CoreError;
pub use merge::{DeviceIndex, SourceData, merge};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DeviceClass, DeviceMap, DeviceRecord, DiscoveredNeighbor, MerakiVpnPeer, PortClassificationMaps,
    PortMap, PortUsageRecord, Reachability, ThirdPartyVpnPeer, UplinkStatus, VpnMode,
};

// Organizations are passed through untouched.
pub use meraki_api::models::Organization;
