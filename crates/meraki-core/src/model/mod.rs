// ── Unified domain model ──
//
// One `DeviceRecord` per serial, assembled from every Dashboard source the
// collector fetched. Port classification inputs live in `ports` and are
// discarded once the merge is done.

pub mod device;
pub mod ports;

// ── Re-exports ──────────────────────────────────────────────────────

pub use device::{
    DeviceMap, DeviceRecord, MerakiVpnPeer, PortUsageRecord, Reachability, ThirdPartyVpnPeer,
    UplinkStatus, VpnMode,
};
pub use ports::{DeviceClass, DiscoveredNeighbor, PortClassificationMaps, PortMap};
