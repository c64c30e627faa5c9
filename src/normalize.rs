// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document normalization - the idempotent transform run on every load and
//! before every persist. Legacy field handling lives here and nowhere else.

use crate::types::{
    Connection, Device, NetworkDoc, CONNECTION_FORBIDDEN_KEYS, DEVICE_FORBIDDEN_KEYS,
};
use tracing::debug;

/// Fixed column count for the floor-plan grid fallback
pub const GRID_COLUMNS: usize = 10;

/// Deterministic grid coordinates for a device missing `x`/`y`.
/// Pure function of the device's index in the list, so repeated
/// normalization of unmigrated data is idempotent.
#[must_use]
pub fn grid_position(index: usize) -> (f64, f64) {
    let x = (index % GRID_COLUMNS) * 120 + 50;
    let y = (index / GRID_COLUMNS) * 150 + 50;
    (x as f64, y as f64)
}

/// Normalize the whole document in place. Safe to run any number of times.
pub fn normalize(doc: &mut NetworkDoc) {
    for (i, device) in doc.devices.iter_mut().enumerate() {
        normalize_device(device, i);
    }
    for conn in &mut doc.connections {
        normalize_connection(conn);
    }
}

fn normalize_device(device: &mut Device, index: usize) {
    // Merge legacy duplicates into the canonical fields. The canonical value
    // wins when both are present and different.
    if let Some(value) = device.extra.remove("rack") {
        if device.rack_id.as_deref().map_or(true, str::is_empty) {
            if let Some(s) = value.as_str() {
                if !s.is_empty() {
                    debug!("device {}: merging legacy 'rack' into rackId", device.id);
                    device.rack_id = Some(s.to_string());
                }
            }
        }
    }
    if let Some(value) = device.extra.remove("rear") {
        if device.is_rear.is_none() {
            if let Some(b) = value.as_bool() {
                device.is_rear = Some(b);
            }
        }
    }

    // Strip forbidden fields outright
    for key in DEVICE_FORBIDDEN_KEYS {
        device.extra.remove(*key);
    }

    // Case folding
    device.device_type = device.device_type.to_lowercase();
    device.status = device.status.to_lowercase();
    if let Some(rack) = device.rack_id.take() {
        device.rack_id = Some(rack.to_uppercase());
    }

    // Grid layout fallback for unmigrated devices
    let (gx, gy) = grid_position(index);
    device.x.get_or_insert(gx);
    device.y.get_or_insert(gy);
}

fn normalize_connection(conn: &mut Connection) {
    if let Some(value) = conn.extra.remove("color") {
        if conn.cable_color.is_none() {
            if let Some(s) = value.as_str() {
                if !s.is_empty() {
                    debug!("connection {}: merging legacy 'color' into cableColor", conn.id);
                    conn.cable_color = Some(s.to_string());
                }
            }
        }
    }

    for key in CONNECTION_FORBIDDEN_KEYS {
        conn.extra.remove(*key);
    }

    conn.conn_type = conn.conn_type.to_lowercase();
    conn.status = conn.status.to_lowercase();
    if let Some(marker) = conn.cable_marker.take() {
        conn.cable_marker = Some(marker.to_uppercase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn device_from_json(raw: serde_json::Value) -> Device {
        serde_json::from_value(raw).unwrap()
    }

    fn conn_from_json(raw: serde_json::Value) -> Connection {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_grid_position() {
        assert_eq!(grid_position(0), (50.0, 50.0));
        assert_eq!(grid_position(1), (170.0, 50.0));
        assert_eq!(grid_position(9), (1130.0, 50.0));
        assert_eq!(grid_position(10), (50.0, 200.0));
        assert_eq!(grid_position(25), (650.0, 350.0));
    }

    #[test]
    fn test_legacy_rack_merges_into_rack_id() {
        let mut device = device_from_json(json!({
            "id": 1, "name": "SW1", "type": "switch", "rack": "a1"
        }));
        normalize_device(&mut device, 0);
        assert_eq!(device.rack_id.as_deref(), Some("A1"));
        assert!(!device.extra.contains_key("rack"));
    }

    #[test]
    fn test_canonical_rack_id_wins_over_legacy() {
        let mut device = device_from_json(json!({
            "id": 1, "name": "SW1", "type": "switch",
            "rack": "B2", "rackId": "A1"
        }));
        normalize_device(&mut device, 0);
        assert_eq!(device.rack_id.as_deref(), Some("A1"));
        assert!(!device.extra.contains_key("rack"));
    }

    #[test]
    fn test_legacy_rear_merges_into_is_rear() {
        let mut device = device_from_json(json!({
            "id": 3, "name": "PP1", "type": "patch_panel", "rear": true
        }));
        normalize_device(&mut device, 0);
        assert_eq!(device.is_rear, Some(true));
        assert!(!device.extra.contains_key("rear"));
    }

    #[test]
    fn test_forbidden_device_fields_stripped() {
        let mut device = device_from_json(json!({
            "id": 2, "name": "FW1", "type": "Firewall",
            "zone": "DMZ", "zoneIP": "10.0.0.1", "_isExternal": false, "room": "R1"
        }));
        normalize_device(&mut device, 0);
        for key in DEVICE_FORBIDDEN_KEYS {
            assert!(!device.extra.contains_key(*key), "{key} should be stripped");
        }
        assert_eq!(device.device_type, "firewall");
    }

    #[test]
    fn test_unknown_extra_keys_pass_through() {
        let mut device = device_from_json(json!({
            "id": 4, "name": "SW2", "type": "switch", "serialNumber": "XJ-99"
        }));
        normalize_device(&mut device, 0);
        assert_eq!(
            device.extra.get("serialNumber").and_then(|v| v.as_str()),
            Some("XJ-99")
        );
    }

    #[test]
    fn test_legacy_color_merges_into_cable_color() {
        let mut conn = conn_from_json(json!({
            "id": "c1", "from": 1, "to": 2, "type": "LAN",
            "color": "#ff0000", "roomId": 7, "cableMarker": "k12"
        }));
        normalize_connection(&mut conn);
        assert_eq!(conn.cable_color.as_deref(), Some("#ff0000"));
        assert!(!conn.extra.contains_key("color"));
        assert!(!conn.extra.contains_key("roomId"));
        assert_eq!(conn.conn_type, "lan");
        assert_eq!(conn.cable_marker.as_deref(), Some("K12"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut doc: NetworkDoc = serde_json::from_value(json!({
            "devices": [
                {"id": 1, "name": "SW1", "type": "Switch", "rack": "a1", "zone": "DMZ"},
                {"id": 2, "name": "RT1", "type": "router", "x": 400.0, "y": 80.0}
            ],
            "connections": [
                {"id": "c1", "from": 1, "to": 2, "type": "LAN", "color": "#00ff00"}
            ]
        }))
        .unwrap();

        normalize(&mut doc);
        let once = serde_json::to_string(&doc).unwrap();
        normalize(&mut doc);
        let twice = serde_json::to_string(&doc).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_grid_fallback_preserves_existing_coordinates() {
        let mut doc: NetworkDoc = serde_json::from_value(json!({
            "devices": [
                {"id": 1, "name": "A", "type": "switch", "x": 999.0, "y": 1.0},
                {"id": 2, "name": "B", "type": "switch"}
            ],
            "connections": []
        }))
        .unwrap();
        normalize(&mut doc);
        assert_eq!(doc.devices[0].x, Some(999.0));
        assert_eq!(doc.devices[0].y, Some(1.0));
        assert_eq!(doc.devices[1].x, Some(170.0));
        assert_eq!(doc.devices[1].y, Some(50.0));
    }
}
