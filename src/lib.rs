// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Cablemap library - wiring map for your physical network inventory
//!
//! This crate provides the core data model for tracking network devices,
//! the cable connections between them (including wall jacks and external
//! uplinks), and the floor-plan entities used to lay them out.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod normalize;
pub mod store;
pub mod validate;

/// Core data types matching the persisted network document
pub mod types {
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value};
    use sha2::{Digest, Sha256};
    use std::fmt;

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Connection identifier - historic documents carry both numeric and
    /// string ids, so both shapes round-trip unchanged.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum ConnId {
        /// Numeric id (pre-v3 documents)
        Num(i64),
        /// String id (v3+ documents, `conn:<hash>` for new records)
        Text(String),
    }

    impl Default for ConnId {
        fn default() -> Self {
            Self::Text(String::new())
        }
    }

    impl fmt::Display for ConnId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Num(n) => write!(f, "{n}"),
                Self::Text(s) => write!(f, "{s}"),
            }
        }
    }

    impl From<&str> for ConnId {
        fn from(s: &str) -> Self {
            Self::Text(s.to_string())
        }
    }

    impl ConnId {
        /// True for the placeholder id of a record that never had one
        #[must_use]
        pub fn is_empty(&self) -> bool {
            matches!(self, Self::Text(s) if s.is_empty())
        }
    }

    // =========================================================================
    // Device
    // =========================================================================

    /// One address record on a device. All four keys are always present on
    /// the wire; absent values serialize as null.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Address {
        /// IP address
        #[serde(default)]
        pub ip: Option<String>,
        /// Network / subnet label
        #[serde(default)]
        pub network: Option<String>,
        /// VLAN tag
        #[serde(default)]
        pub vlan: Option<String>,
        /// Security zone (e.g. DMZ)
        #[serde(default)]
        pub zone: Option<String>,
    }

    /// One physical port on a device
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Port {
        /// Port name (e.g. "Gi0/1")
        #[serde(default)]
        pub name: String,
        /// Port type (rj45, sfp, ...)
        #[serde(rename = "type", default)]
        pub port_type: String,
        /// Free-form description
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
    }

    /// A physical or logical network component
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Device {
        /// Unique positive id; 0 means the record arrived without one
        #[serde(default)]
        pub id: u32,
        /// Human label
        #[serde(default)]
        pub name: String,
        /// Lowercase category tag (switch, router, patch_panel, ...). Open set.
        #[serde(rename = "type", default)]
        pub device_type: String,
        /// Lowercase lifecycle tag (active, disabled, ...)
        #[serde(default)]
        pub status: String,
        /// Free-form physical place; may name a Location code
        #[serde(default)]
        pub location: String,
        /// Canonical UPPERCASE rack/group identifier
        #[serde(rename = "rackId", default, skip_serializing_if = "Option::is_none")]
        pub rack_id: Option<String>,
        /// Rear-of-rack mounting
        #[serde(rename = "isRear", default, skip_serializing_if = "Option::is_none")]
        pub is_rear: Option<bool>,
        /// Address records; empty for unmanaged gear
        #[serde(default)]
        pub addresses: Vec<Address>,
        /// Port descriptors; empty allowed
        #[serde(default)]
        pub ports: Vec<Port>,
        /// Floor-plan x coordinate; filled by the grid fallback when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub x: Option<f64>,
        /// Floor-plan y coordinate
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub y: Option<f64>,
        /// Legacy/unknown keys. Normalization merges `rack`/`rear` into the
        /// canonical fields and strips the forbidden ones; anything else
        /// passes through untouched.
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    /// Legacy device keys removed by normalization
    pub const DEVICE_FORBIDDEN_KEYS: &[&str] =
        &["rack", "rear", "zone", "zoneIP", "_isExternal", "room"];

    // =========================================================================
    // Connection
    // =========================================================================

    /// Where a connection terminates, resolved from the flattened wire shape
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Destination {
        /// A real device in the store
        Device(u32),
        /// A physical wall jack label (Z1, A-04, ...)
        WallJack(String),
        /// An external network name (ISP, Internet, ...)
        ExternalNetwork(String),
    }

    /// One cable/link record between two endpoints
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Connection {
        /// Unique id within the store
        #[serde(default)]
        pub id: ConnId,
        /// Source device id; required
        #[serde(default)]
        pub from: u32,
        /// Destination device id, or null for external/wall-jack terminations
        #[serde(default)]
        pub to: Option<u32>,
        /// Source port name
        #[serde(rename = "fromPort", default, skip_serializing_if = "Option::is_none")]
        pub from_port: Option<String>,
        /// Destination port name
        #[serde(rename = "toPort", default, skip_serializing_if = "Option::is_none")]
        pub to_port: Option<String>,
        /// Non-device endpoint label; required non-empty when `to` is null,
        /// must stay empty when `to` is set
        #[serde(rename = "externalDest", default)]
        pub external_dest: String,
        /// When true, `external_dest` is a wall-jack label rather than an
        /// external network name
        #[serde(rename = "isWallJack", default)]
        pub is_wall_jack: bool,
        /// Lowercase cable/link category (lan, wan, trunk, wallport, fiber, ...)
        #[serde(rename = "type", default)]
        pub conn_type: String,
        /// Lowercase lifecycle tag
        #[serde(default)]
        pub status: String,
        /// Canonical #RRGGBB cable colour; legacy `color` merges in
        #[serde(rename = "cableColor", default, skip_serializing_if = "Option::is_none")]
        pub cable_color: Option<String>,
        /// UPPERCASE cable marker label
        #[serde(rename = "cableMarker", default, skip_serializing_if = "Option::is_none")]
        pub cable_marker: Option<String>,
        /// Wall-jack passthrough note on a device-to-device link. Replaces
        /// the legacy habit of setting `externalDest` next to a non-null `to`.
        #[serde(rename = "viaLabel", default, skip_serializing_if = "Option::is_none")]
        pub via_label: Option<String>,
        /// Legacy/unknown keys, handled like [`Device::extra`]
        #[serde(flatten)]
        pub extra: Map<String, Value>,
    }

    /// Legacy connection keys removed by normalization
    pub const CONNECTION_FORBIDDEN_KEYS: &[&str] = &["color", "roomId"];

    impl Connection {
        /// Resolve the flattened wire fields into a tagged destination.
        /// Returns None for a dangling record (no device, no label).
        #[must_use]
        pub fn destination(&self) -> Option<Destination> {
            match self.to {
                Some(id) => Some(Destination::Device(id)),
                None if !self.external_dest.is_empty() => Some(if self.is_wall_jack {
                    Destination::WallJack(self.external_dest.clone())
                } else {
                    Destination::ExternalNetwork(self.external_dest.clone())
                }),
                None => None,
            }
        }

        /// True when the connection terminates at a wall jack or external
        /// network rather than a device
        #[must_use]
        pub fn is_external(&self) -> bool {
            self.to.is_none() && !self.external_dest.is_empty()
        }

        /// True when the connection touches the given device on either end
        #[must_use]
        pub fn references(&self, device_id: u32) -> bool {
            self.from == device_id || self.to == Some(device_id)
        }

        /// Generate a deterministic id for a connection
        #[must_use]
        pub fn generate_id(
            from: u32,
            to: Option<u32>,
            external_dest: &str,
            from_port: Option<&str>,
            to_port: Option<&str>,
        ) -> String {
            let mut hasher = Sha256::new();
            hasher.update(from.to_string().as_bytes());
            if let Some(t) = to {
                hasher.update(t.to_string().as_bytes());
            }
            hasher.update(external_dest.as_bytes());
            if let Some(p) = from_port {
                hasher.update(p.as_bytes());
            }
            if let Some(p) = to_port {
                hasher.update(p.as_bytes());
            }
            let hash = hex::encode(hasher.finalize());
            format!("conn:{}", &hash[..8])
        }
    }

    // =========================================================================
    // Site / Location
    // =========================================================================

    /// Top-level grouping, e.g. a building
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Site {
        /// Unique id
        #[serde(default)]
        pub id: u32,
        /// Display name
        #[serde(default)]
        pub name: String,
        /// At most one site should be the default
        #[serde(rename = "isDefault", default)]
        pub is_default: bool,
    }

    /// Named sub-group within a location, used purely for floor-plan layout
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct LocationGroup {
        /// Group name (AREA, ENDPOINT, WALLJACK, ...)
        #[serde(default)]
        pub name: String,
        /// Display colour
        #[serde(default)]
        pub color: String,
    }

    /// A room/area within a site
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Location {
        /// Unique id, assigned from `nextLocationId`
        #[serde(default)]
        pub id: u32,
        /// Short code, unique within the store
        #[serde(default)]
        pub code: String,
        /// Display name
        #[serde(default)]
        pub name: String,
        /// Owning site id
        #[serde(rename = "siteId", default)]
        pub site_id: u32,
        /// Layout sub-groups
        #[serde(default)]
        pub groups: Vec<LocationGroup>,
    }

    // =========================================================================
    // Virtual endpoints
    // =========================================================================

    /// The deduplicated logical node formed by grouping all connections
    /// sharing the same external destination label
    #[derive(Debug, Clone, Serialize)]
    pub struct VirtualEndpoint {
        /// Exact external destination label (case-sensitive, untrimmed)
        pub label: String,
        /// Wall jack vs external network
        #[serde(rename = "isWallJack")]
        pub is_wall_jack: bool,
        /// Ids of every connection terminating here
        pub connections: Vec<ConnId>,
    }

    // =========================================================================
    // Document
    // =========================================================================

    fn default_counter() -> u32 {
        1
    }

    fn default_version() -> String {
        "4.1".to_string()
    }

    /// The complete persisted network document (stable top-level shape)
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct NetworkDoc {
        /// All devices
        #[serde(default)]
        pub devices: Vec<Device>,
        /// All connections
        #[serde(default)]
        pub connections: Vec<Connection>,
        /// Legacy room records, superseded by `locations`; passed through
        #[serde(default)]
        pub rooms: Vec<Value>,
        /// All sites
        #[serde(default)]
        pub sites: Vec<Site>,
        /// All locations
        #[serde(default)]
        pub locations: Vec<Location>,
        /// Monotonic device id counter
        #[serde(rename = "nextDeviceId", default = "default_counter")]
        pub next_device_id: u32,
        /// Monotonic location id counter
        #[serde(rename = "nextLocationId", default = "default_counter")]
        pub next_location_id: u32,
        /// Schema version tag
        #[serde(default = "default_version")]
        pub version: String,
        /// ISO-8601 timestamp of the last persist
        #[serde(rename = "exportedAt", default, skip_serializing_if = "Option::is_none")]
        pub exported_at: Option<String>,
    }

    impl Default for NetworkDoc {
        fn default() -> Self {
            Self {
                devices: Vec::new(),
                connections: Vec::new(),
                rooms: Vec::new(),
                sites: Vec::new(),
                locations: Vec::new(),
                next_device_id: 1,
                next_location_id: 1,
                version: default_version(),
                exported_at: None,
            }
        }
    }

    impl NetworkDoc {
        /// Look up a device by id
        #[must_use]
        pub fn get_device(&self, id: u32) -> Option<&Device> {
            self.devices.iter().find(|d| d.id == id)
        }

        /// Look up a connection by id
        #[must_use]
        pub fn get_connection(&self, id: &ConnId) -> Option<&Connection> {
            self.connections.iter().find(|c| &c.id == id)
        }
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::StoreError;
    pub use crate::store::NetworkTopology;
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
