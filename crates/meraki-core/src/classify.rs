// Port and neighbor classification heuristics
//
// Pure functions over the per-collection lookup tables. A port is reported
// only when it is an uplink (backbone neighbor, or tagged and live) or when
// it feeds an access point.

use std::collections::HashMap;

use meraki_api::models::DiscoveryField;

use crate::model::{DeviceClass, DiscoveredNeighbor, PortMap};

const VENDOR_KEYWORD: &str = "MERAKI";
const UPLINK_TAG: &str = "uplink";
const CONNECTED: &str = "connected";
const UNNAMED_NEIGHBOR: &str = "N/A";

// ── Ports ───────────────────────────────────────────────────────────

/// Decide whether a switch port carries upstream traffic.
///
/// First match wins:
/// 1. a Meraki switch or appliance was discovered on the port
/// 2. the port is tagged `uplink` and its link is `connected`
pub fn classify_uplink(
    serial: &str,
    port_id: &str,
    tags: &PortMap<Vec<String>>,
    discovery: &PortMap<DiscoveredNeighbor>,
    status: &PortMap<String>,
) -> bool {
    if discovery
        .get(serial, port_id)
        .is_some_and(|neighbor| neighbor.class.is_backbone())
    {
        return true;
    }

    let tagged = tags
        .get(serial, port_id)
        .is_some_and(|tags| tags.iter().any(|t| t == UPLINK_TAG));

    tagged
        && status
            .get(serial, port_id)
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(CONNECTED))
}

/// Display name of the access point attached to a port, if there is one.
pub fn classify_access_point(
    serial: &str,
    port_id: &str,
    discovery: &PortMap<DiscoveredNeighbor>,
) -> Option<String> {
    let neighbor = discovery.get(serial, port_id)?;
    (neighbor.class == DeviceClass::AccessPoint)
        .then(|| neighbor_display_name(neighbor.system_name.as_deref()))
}

/// Friendly name from an LLDP system name.
///
/// Meraki advertises `"<model> - <name>"`; the part after the last
/// separator is kept. Missing or blank names become `"N/A"`.
pub fn neighbor_display_name(system_name: Option<&str>) -> String {
    let name = system_name
        .map(|raw| raw.rsplit_once(" - ").map_or(raw, |(_, tail)| tail).trim())
        .unwrap_or_default();
    if name.is_empty() {
        UNNAMED_NEIGHBOR.to_owned()
    } else {
        name.to_owned()
    }
}

// ── Neighbors ───────────────────────────────────────────────────────

/// `"System name"` -> `"system_name"`.
pub fn normalize_field_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

/// Flatten CDP or LLDP name/value pairs into a lookup with normalized keys.
pub fn discovery_fields(fields: &[DiscoveryField]) -> HashMap<String, String> {
    fields
        .iter()
        .filter_map(|field| Some((normalize_field_key(&field.name), field.value_text()?)))
        .collect()
}

/// Identify a Meraki neighbor from its CDP and LLDP advertisements.
///
/// CDP `platform` is checked first, then LLDP `system_name` and
/// `system_description`. Either must mention the vendor; the first product
/// code (in [`DeviceClass::ordered`] order) found as a token wins.
pub fn classify_vendor_neighbor(
    cdp: &HashMap<String, String>,
    lldp: &HashMap<String, String>,
) -> Option<DeviceClass> {
    if let Some(class) = cdp
        .get("platform")
        .and_then(|platform| match_vendor_text(&platform.to_uppercase()))
    {
        return Some(class);
    }

    let name = lldp.get("system_name").map(String::as_str).unwrap_or_default();
    let description = lldp
        .get("system_description")
        .map(String::as_str)
        .unwrap_or_default();
    if name.is_empty() && description.is_empty() {
        return None;
    }
    match_vendor_text(&format!("{name} {description}").to_uppercase())
}

/// Neighbor entry for one port, or `None` when nothing Meraki was seen.
pub fn discovered_neighbor(
    cdp: &[DiscoveryField],
    lldp: &[DiscoveryField],
) -> Option<DiscoveredNeighbor> {
    let cdp = discovery_fields(cdp);
    let lldp = discovery_fields(lldp);
    let class = classify_vendor_neighbor(&cdp, &lldp)?;
    let system_name = lldp
        .get("system_name")
        .or_else(|| cdp.get("device_id"))
        .cloned();
    Some(DiscoveredNeighbor { class, system_name })
}

fn match_vendor_text(upper: &str) -> Option<DeviceClass> {
    if !upper.contains(VENDOR_KEYWORD) {
        return None;
    }
    let tokens: Vec<&str> = upper
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    DeviceClass::ordered().find(|class| tokens.iter().any(|t| token_matches(t, class.code())))
}

/// `MS` matches `MS` and `MS220`, not `MSX`.
fn token_matches(token: &str, code: &str) -> bool {
    token
        .strip_prefix(code)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use meraki_api::models::DiscoveryField;
    use serde_json::json;

    use super::{
        classify_access_point, classify_uplink, classify_vendor_neighbor, discovered_neighbor,
        neighbor_display_name, normalize_field_key,
    };
    use crate::model::{DeviceClass, DiscoveredNeighbor, PortMap};

    const SW: &str = "Q2SW-0001";

    fn neighbor(class: DeviceClass, name: &str) -> DiscoveredNeighbor {
        DiscoveredNeighbor {
            class,
            system_name: Some(name.to_owned()),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (normalize_field_key(k), (*v).to_owned()))
            .collect()
    }

    // ── Uplinks ─────────────────────────────────────────────────────

    #[test]
    fn backbone_neighbor_wins_over_tags_and_status() {
        let tags = PortMap::new();
        let mut status = PortMap::new();
        status.insert(SW, "49", "Disconnected".to_owned());
        let mut discovery = PortMap::new();
        discovery.insert(SW, "49", neighbor(DeviceClass::Switch, "Meraki MS250 - Core"));
        discovery.insert(SW, "50", neighbor(DeviceClass::Appliance, "Meraki MX85 - Edge"));

        assert!(classify_uplink(SW, "49", &tags, &discovery, &status));
        assert!(classify_uplink(SW, "50", &tags, &discovery, &status));
    }

    #[test]
    fn tagged_port_needs_a_live_link() {
        let mut tags = PortMap::new();
        tags.insert(SW, "1", vec!["uplink".to_owned()]);
        tags.insert(SW, "2", vec!["uplink".to_owned(), "core".to_owned()]);
        let mut status = PortMap::new();
        status.insert(SW, "1", "Disconnected".to_owned());
        status.insert(SW, "2", "Connected".to_owned());
        let discovery = PortMap::new();

        assert!(!classify_uplink(SW, "1", &tags, &discovery, &status));
        assert!(classify_uplink(SW, "2", &tags, &discovery, &status));
        // Tagged with no status entry at all
        tags.insert(SW, "3", vec!["uplink".to_owned()]);
        assert!(!classify_uplink(SW, "3", &tags, &discovery, &status));
    }

    #[test]
    fn access_point_neighbor_is_not_an_uplink() {
        let mut discovery = PortMap::new();
        discovery.insert(SW, "5", neighbor(DeviceClass::AccessPoint, "Meraki MR46 - Lobby"));

        assert!(!classify_uplink(SW, "5", &PortMap::new(), &discovery, &PortMap::new()));
        assert_eq!(
            classify_access_point(SW, "5", &discovery).as_deref(),
            Some("Lobby")
        );
        assert_eq!(classify_access_point(SW, "6", &discovery), None);
    }

    #[test]
    fn display_name_takes_the_last_segment() {
        assert_eq!(neighbor_display_name(Some("Meraki MR46 - Floor 2 - East")), "East");
        assert_eq!(neighbor_display_name(Some("lobby-ap")), "lobby-ap");
        assert_eq!(neighbor_display_name(Some("Meraki MR46 -  ")), "N/A");
        assert_eq!(neighbor_display_name(Some("")), "N/A");
        assert_eq!(neighbor_display_name(None), "N/A");
    }

    // ── Neighbors ───────────────────────────────────────────────────

    #[test]
    fn cdp_platform_is_checked_first() {
        let cdp = fields(&[("Platform", "Meraki MS220-8P Cloud Managed Switch")]);
        let lldp = fields(&[("System name", "Meraki MR46 - Lobby")]);
        assert_eq!(classify_vendor_neighbor(&cdp, &lldp), Some(DeviceClass::Switch));
    }

    #[test]
    fn lldp_name_and_description_are_combined() {
        let lldp = fields(&[
            ("System name", "Lobby"),
            ("System description", "Meraki MR46 Cloud Managed AP"),
        ]);
        assert_eq!(
            classify_vendor_neighbor(&HashMap::new(), &lldp),
            Some(DeviceClass::AccessPoint)
        );
    }

    #[test]
    fn vendor_keyword_is_required() {
        let cdp = fields(&[("Platform", "cisco WS-C2960X MS")]);
        let lldp = fields(&[("System name", "MX-edge")]);
        assert_eq!(classify_vendor_neighbor(&cdp, &lldp), None);
        assert_eq!(classify_vendor_neighbor(&HashMap::new(), &HashMap::new()), None);
    }

    #[test]
    fn codes_must_be_whole_tokens_or_followed_by_digits() {
        let lldp = fields(&[("System description", "Meraki MSX appliance MT12")]);
        assert_eq!(
            classify_vendor_neighbor(&HashMap::new(), &lldp),
            Some(DeviceClass::Sensor)
        );
    }

    #[test]
    fn first_code_in_fixed_order_wins() {
        let lldp = fields(&[("System description", "Meraki MR46 uplinked to MS120")]);
        assert_eq!(
            classify_vendor_neighbor(&HashMap::new(), &lldp),
            Some(DeviceClass::Switch)
        );
    }

    #[test]
    fn discovered_neighbor_keeps_the_system_name() {
        let lldp: Vec<DiscoveryField> = serde_json::from_value(json!([
            { "name": "System name", "value": "Meraki MR46 - Lobby" },
            { "name": "System description", "value": "Meraki MR46 Cloud Managed AP" },
            { "name": "Port ID", "value": 0 }
        ]))
        .expect("fields decode");

        let found = discovered_neighbor(&[], &lldp).expect("meraki neighbor");
        assert_eq!(found.class, DeviceClass::AccessPoint);
        assert_eq!(found.system_name.as_deref(), Some("Meraki MR46 - Lobby"));
        assert!(discovered_neighbor(&[], &[]).is_none());
    }
}
