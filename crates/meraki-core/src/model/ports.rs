// ── Port classification inputs ──
//
// Lookup tables keyed by (serial, port id), built once per collection from
// the switch port config, discovery and status endpoints.

use std::collections::HashMap;

use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Meraki product family, identified by its two-letter model prefix.
///
/// Declaration order is the order codes are tried when classifying a
/// discovered neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, IntoStaticStr)]
pub enum DeviceClass {
    #[strum(serialize = "MS")]
    Switch,
    #[strum(serialize = "MX")]
    Appliance,
    #[strum(serialize = "MR")]
    AccessPoint,
    #[strum(serialize = "MV")]
    Camera,
    #[strum(serialize = "MG")]
    CellularGateway,
    #[strum(serialize = "MT")]
    Sensor,
}

impl DeviceClass {
    /// Model prefix, e.g. `"MS"`.
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Every class in match priority order.
    pub fn ordered() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Neighbors of these classes make a port an uplink on their own.
    pub fn is_backbone(self) -> bool {
        matches!(self, Self::Switch | Self::Appliance)
    }
}

/// A Meraki device seen on the far end of a switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredNeighbor {
    pub class: DeviceClass,
    /// Raw LLDP system name (or CDP device id), e.g. `"Meraki MR46 - Lobby"`.
    pub system_name: Option<String>,
}

/// Two-level `serial -> port id -> T` lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PortMap<T> {
    by_serial: HashMap<String, HashMap<String, T>>,
}

impl<T> Default for PortMap<T> {
    fn default() -> Self {
        Self {
            by_serial: HashMap::new(),
        }
    }
}

impl<T> PortMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, serial: impl Into<String>, port_id: impl Into<String>, value: T) {
        self.by_serial
            .entry(serial.into())
            .or_default()
            .insert(port_id.into(), value);
    }

    pub fn get(&self, serial: &str, port_id: &str) -> Option<&T> {
        self.by_serial.get(serial)?.get(port_id)
    }

    /// Number of devices with at least one port entry.
    pub fn device_count(&self) -> usize {
        self.by_serial.len()
    }

    /// Total number of port entries across all devices.
    pub fn len(&self) -> usize {
        self.by_serial.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(serial, port id, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &T)> {
        self.by_serial.iter().flat_map(|(serial, ports)| {
            ports
                .iter()
                .map(move |(port, value)| (serial.as_str(), port.as_str(), value))
        })
    }
}

/// The three per-port tables consulted by the classifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortClassificationMaps {
    /// Configured port tags.
    pub tags: PortMap<Vec<String>>,
    /// Meraki neighbors found via CDP / LLDP.
    pub discovery: PortMap<DiscoveredNeighbor>,
    /// Physical link status (`"Connected"`, `"Disconnected"`, ...).
    pub status: PortMap<String>,
}

impl PortClassificationMaps {
    pub fn is_uplink(&self, serial: &str, port_id: &str) -> bool {
        crate::classify::classify_uplink(serial, port_id, &self.tags, &self.discovery, &self.status)
    }

    pub fn access_point(&self, serial: &str, port_id: &str) -> Option<String> {
        crate::classify::classify_access_point(serial, port_id, &self.discovery)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceClass, PortMap};

    #[test]
    fn classes_iterate_in_priority_order() {
        let codes: Vec<&str> = DeviceClass::ordered().map(DeviceClass::code).collect();
        assert_eq!(codes, vec!["MS", "MX", "MR", "MV", "MG", "MT"]);
        assert_eq!(DeviceClass::AccessPoint.code(), "MR");
    }

    #[test]
    fn port_map_counts_devices_and_ports() {
        let mut map = PortMap::new();
        map.insert("Q2SW-0001", "1", "Connected".to_owned());
        map.insert("Q2SW-0001", "2", "Disconnected".to_owned());
        map.insert("Q2SW-0002", "1", "Connected".to_owned());

        assert_eq!(map.device_count(), 2);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("Q2SW-0001", "2").map(String::as_str), Some("Disconnected"));
        assert!(map.get("Q2SW-0003", "1").is_none());
    }
}
