// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The network topology store - the in-memory document plus a petgraph
//! index, with validated mutation, normalization, and derivation operations.

use crate::error::StoreError;
use crate::normalize::{self, grid_position};
use crate::types::{
    Address, ConnId, Connection, Device, Location, LocationGroup, NetworkDoc, Port, Site,
    VirtualEndpoint,
};
use crate::validate::{validate, ValidationReport};
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// File name of the persisted document inside the data directory
pub const DATA_FILE: &str = "network.json";
/// File name of the pre-write backup
pub const BACKUP_FILE: &str = "network.json.bak";

/// The topology store with petgraph backing for adjacency queries
pub struct NetworkTopology {
    /// The underlying directed graph (device and virtual-endpoint nodes)
    graph: DiGraph<String, String>,
    /// Map from node key to node index
    node_indices: HashMap<String, NodeIndex>,
    /// The persisted document (devices, connections, sites, locations)
    pub doc: NetworkDoc,
}

/// Input for [`NetworkTopology::add_device`]; the id is assigned by the store
#[derive(Debug, Default, Clone)]
pub struct NewDevice {
    /// Human label
    pub name: String,
    /// Category tag; lowercased on entry
    pub device_type: String,
    /// Lifecycle tag; lowercased on entry
    pub status: String,
    /// Free-form physical place
    pub location: String,
    /// Rack identifier; uppercased on entry
    pub rack_id: Option<String>,
    /// Rear-of-rack mounting
    pub is_rear: Option<bool>,
    /// Address records
    pub addresses: Vec<Address>,
    /// Port descriptors
    pub ports: Vec<Port>,
    /// Floor-plan x; grid fallback applies when absent
    pub x: Option<f64>,
    /// Floor-plan y
    pub y: Option<f64>,
}

/// Partial update for [`NetworkTopology::update_device`]; unset fields are
/// left untouched
#[derive(Debug, Default, Clone)]
pub struct DevicePatch {
    /// New name
    pub name: Option<String>,
    /// New category tag
    pub device_type: Option<String>,
    /// New lifecycle tag
    pub status: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New rack identifier (empty string clears it)
    pub rack_id: Option<String>,
    /// New rear-of-rack flag
    pub is_rear: Option<bool>,
    /// New x coordinate
    pub x: Option<f64>,
    /// New y coordinate
    pub y: Option<f64>,
}

/// Input for [`NetworkTopology::add_connection`]. Exactly one of `to` /
/// `external_dest` must be given.
#[derive(Debug, Default, Clone)]
pub struct NewConnection {
    /// Source device id
    pub from: u32,
    /// Destination device id (device-to-device link)
    pub to: Option<u32>,
    /// External/wall-jack label (non-device termination)
    pub external_dest: Option<String>,
    /// The label names a wall jack rather than an external network
    pub is_wall_jack: bool,
    /// Source port name
    pub from_port: Option<String>,
    /// Destination port name
    pub to_port: Option<String>,
    /// Cable/link category; lowercased on entry
    pub conn_type: String,
    /// Lifecycle tag; lowercased on entry
    pub status: String,
    /// #RRGGBB cable colour
    pub cable_color: Option<String>,
    /// Cable marker label; uppercased on entry
    pub cable_marker: Option<String>,
    /// Wall-jack passthrough note for device-to-device links
    pub via_label: Option<String>,
}

/// Partial update for [`NetworkTopology::update_connection`].
///
/// Setting a device destination clears any external label and vice versa,
/// so the exactly-one-destination invariant holds after every successful
/// update. The store is left unchanged when the patch cannot be applied.
#[derive(Debug, Default, Clone)]
pub struct ConnectionPatch {
    /// New source device id
    pub from: Option<u32>,
    /// New destination device id
    pub to: Option<u32>,
    /// New external/wall-jack label
    pub external_dest: Option<String>,
    /// New wall-jack flag
    pub is_wall_jack: Option<bool>,
    /// New source port
    pub from_port: Option<String>,
    /// New destination port
    pub to_port: Option<String>,
    /// New category tag
    pub conn_type: Option<String>,
    /// New lifecycle tag
    pub status: Option<String>,
    /// New cable colour
    pub cable_color: Option<String>,
    /// New cable marker
    pub cable_marker: Option<String>,
    /// New passthrough note (empty string clears it)
    pub via_label: Option<String>,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkTopology {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            doc: NetworkDoc::default(),
        }
    }

    // =========================================================================
    // Load / save
    // =========================================================================

    /// Parse a raw JSON document into a normalized store.
    ///
    /// Fails with [`StoreError::Parse`] on malformed JSON and
    /// [`StoreError::Schema`] when the required top-level arrays are missing
    /// or of the wrong shape. Data-level problems never fail the load; run
    /// [`Self::validate`] for those.
    pub fn from_json(raw: &str) -> std::result::Result<Self, StoreError> {
        let value: Value = serde_json::from_str(raw).map_err(StoreError::Parse)?;
        let Value::Object(obj) = value else {
            return Err(StoreError::Schema("top level must be an object".into()));
        };
        for key in ["devices", "connections"] {
            match obj.get(key) {
                Some(Value::Array(_)) => {}
                Some(_) => {
                    return Err(StoreError::Schema(format!("\"{key}\" must be an array")));
                }
                None => {
                    return Err(StoreError::Schema(format!(
                        "missing required array \"{key}\""
                    )));
                }
            }
        }
        let doc: NetworkDoc = serde_json::from_value(Value::Object(obj))
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        let mut store = Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            doc,
        };
        store.normalize();
        store.rebuild_graph();
        Ok(store)
    }

    /// Serialize the document (stable field order, pretty-printed)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.doc).context("Failed to serialize network document")
    }

    /// Load the store from `network.json` in the given directory. A missing
    /// file yields an empty store, like a first run.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(DATA_FILE);
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let store = Self::from_json(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        Ok(store)
    }

    /// Persist the store to `network.json` in the given directory.
    ///
    /// The document is re-normalized and timestamped first. When a previous
    /// file exists it is copied to `network.json.bak` before the overwrite;
    /// a failed backup aborts the save so the on-disk state stays intact.
    pub fn save(&mut self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        self.normalize();
        self.doc.exported_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        let path = dir.join(DATA_FILE);
        if path.exists() {
            let backup = dir.join(BACKUP_FILE);
            fs::copy(&path, &backup).with_context(|| {
                format!(
                    "Failed to back up {} - refusing to overwrite",
                    path.display()
                )
            })?;
        }

        let json = self.to_json()?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Run the idempotent normalization pass over the document
    pub fn normalize(&mut self) {
        normalize::normalize(&mut self.doc);
    }

    /// Run the full validation rule set
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate(&self.doc)
    }

    /// SHA-256 hex digest over the canonical serialization. Struct field
    /// order fixes the key order, so identical content always hashes
    /// identically regardless of how the document was assembled.
    pub fn checksum(&self) -> Result<String> {
        let canonical =
            serde_json::to_string(&self.doc).context("Failed to serialize for checksum")?;
        Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
    }

    // =========================================================================
    // Graph index
    // =========================================================================

    /// Rebuild the petgraph index from the document
    fn rebuild_graph(&mut self) {
        self.graph.clear();
        self.node_indices.clear();

        for device in &self.doc.devices {
            let key = device_key(device.id);
            let idx = self.graph.add_node(key.clone());
            self.node_indices.insert(key, idx);
        }

        // Collect edges first; virtual endpoint nodes are created lazily
        let edges: Vec<(String, String, String)> = self
            .doc
            .connections
            .iter()
            .filter_map(|conn| {
                let target = match conn.to {
                    Some(to) => device_key(to),
                    None if !conn.external_dest.is_empty() => {
                        endpoint_key(&conn.external_dest, conn.is_wall_jack)
                    }
                    None => return None,
                };
                Some((device_key(conn.from), target, conn.id.to_string()))
            })
            .collect();

        for (from_key, to_key, conn_id) in edges {
            let Some(&from_idx) = self.node_indices.get(&from_key) else {
                continue; // dangling 'from'; validate() reports it
            };
            let to_idx = match self.node_indices.get(&to_key) {
                Some(&idx) => idx,
                None if !to_key.starts_with("device:") => {
                    let idx = self.graph.add_node(to_key.clone());
                    self.node_indices.insert(to_key, idx);
                    idx
                }
                None => continue,
            };
            self.graph.add_edge(from_idx, to_idx, conn_id);
        }
    }

    /// Node keys adjacent to a device, in either direction, sorted
    #[must_use]
    pub fn neighbors(&self, device_id: u32) -> Vec<String> {
        let Some(&idx) = self.node_indices.get(&device_key(device_id)) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = self
            .graph
            .neighbors_undirected(idx)
            .map(|n| self.graph[n].clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    // =========================================================================
    // Device operations
    // =========================================================================

    /// Add a device; the id comes from `nextDeviceId`, bumped past the max
    /// existing id if the counter lags behind imported data
    pub fn add_device(&mut self, spec: NewDevice) -> u32 {
        let max_id = self.doc.devices.iter().map(|d| d.id).max().unwrap_or(0);
        let id = self.doc.next_device_id.max(max_id + 1);
        self.doc.next_device_id = id + 1;

        let (gx, gy) = grid_position(self.doc.devices.len());
        let device = Device {
            id,
            name: spec.name,
            device_type: spec.device_type.to_lowercase(),
            status: spec.status.to_lowercase(),
            location: spec.location,
            rack_id: spec.rack_id.map(|r| r.to_uppercase()),
            is_rear: spec.is_rear,
            addresses: spec.addresses,
            ports: spec.ports,
            x: Some(spec.x.unwrap_or(gx)),
            y: Some(spec.y.unwrap_or(gy)),
            extra: serde_json::Map::new(),
        };
        self.doc.devices.push(device);
        self.rebuild_graph();
        id
    }

    /// Update a device in place; unset patch fields are left untouched
    pub fn update_device(
        &mut self,
        id: u32,
        patch: DevicePatch,
    ) -> std::result::Result<(), StoreError> {
        let device = self
            .doc
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "device",
                id: id.to_string(),
            })?;

        if let Some(name) = patch.name {
            device.name = name;
        }
        if let Some(t) = patch.device_type {
            device.device_type = t.to_lowercase();
        }
        if let Some(s) = patch.status {
            device.status = s.to_lowercase();
        }
        if let Some(l) = patch.location {
            device.location = l;
        }
        if let Some(rack) = patch.rack_id {
            device.rack_id = if rack.is_empty() {
                None
            } else {
                Some(rack.to_uppercase())
            };
        }
        if let Some(rear) = patch.is_rear {
            device.is_rear = Some(rear);
        }
        if let Some(x) = patch.x {
            device.x = Some(x);
        }
        if let Some(y) = patch.y {
            device.y = Some(y);
        }
        Ok(())
    }

    /// Delete a device.
    ///
    /// Fails with [`StoreError::Conflict`] when any connection still
    /// references it, unless `cascade` is set, in which case the referencing
    /// connections are deleted first. Returns the number of connections
    /// removed.
    pub fn delete_device(
        &mut self,
        id: u32,
        cascade: bool,
    ) -> std::result::Result<usize, StoreError> {
        if self.doc.get_device(id).is_none() {
            return Err(StoreError::NotFound {
                kind: "device",
                id: id.to_string(),
            });
        }

        let referencing: Vec<String> = self
            .doc
            .connections
            .iter()
            .filter(|c| c.references(id))
            .map(|c| c.id.to_string())
            .collect();

        if !referencing.is_empty() && !cascade {
            return Err(StoreError::Conflict(format!(
                "device {} is referenced by {} connection(s): {}",
                id,
                referencing.len(),
                referencing.join(", ")
            )));
        }

        let removed = referencing.len();
        self.doc.connections.retain(|c| !c.references(id));
        self.doc.devices.retain(|d| d.id != id);
        self.rebuild_graph();
        Ok(removed)
    }

    // =========================================================================
    // Connection operations
    // =========================================================================

    /// Add a connection, enforcing the exactly-one-destination invariant at
    /// construction time
    pub fn add_connection(
        &mut self,
        spec: NewConnection,
    ) -> std::result::Result<ConnId, StoreError> {
        let external = spec.external_dest.unwrap_or_default();
        if spec.to.is_some() && !external.is_empty() {
            return Err(StoreError::InvalidEndpoint(
                "both a destination device and an external label were given; \
                 use a viaLabel for wall-jack passthrough"
                    .into(),
            ));
        }
        if spec.to.is_none() && external.is_empty() {
            return Err(StoreError::InvalidEndpoint(
                "a connection needs a destination device or an external label".into(),
            ));
        }

        if self.doc.get_device(spec.from).is_none() {
            return Err(StoreError::NotFound {
                kind: "device",
                id: spec.from.to_string(),
            });
        }
        if let Some(to) = spec.to {
            if self.doc.get_device(to).is_none() {
                return Err(StoreError::NotFound {
                    kind: "device",
                    id: to.to_string(),
                });
            }
        }

        let base = Connection::generate_id(
            spec.from,
            spec.to,
            &external,
            spec.from_port.as_deref(),
            spec.to_port.as_deref(),
        );
        // Identical cables are legal; salt the content hash until unique
        let mut id = base.clone();
        let mut salt = 0;
        while self.doc.get_connection(&ConnId::Text(id.clone())).is_some() {
            salt += 1;
            id = format!("{base}-{salt}");
        }
        let id = ConnId::Text(id);

        let conn = Connection {
            id: id.clone(),
            from: spec.from,
            to: spec.to,
            from_port: spec.from_port,
            to_port: spec.to_port,
            external_dest: external,
            is_wall_jack: spec.is_wall_jack,
            conn_type: spec.conn_type.to_lowercase(),
            status: spec.status.to_lowercase(),
            cable_color: spec.cable_color,
            cable_marker: spec.cable_marker.map(|m| m.to_uppercase()),
            via_label: spec.via_label,
            extra: serde_json::Map::new(),
        };
        self.doc.connections.push(conn);
        self.rebuild_graph();
        Ok(id)
    }

    /// Update a connection all-or-nothing: the patched record is checked
    /// against the destination invariant and endpoint existence before it
    /// replaces the stored one.
    pub fn update_connection(
        &mut self,
        id: &ConnId,
        patch: ConnectionPatch,
    ) -> std::result::Result<(), StoreError> {
        let pos = self
            .doc
            .connections
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "connection",
                id: id.to_string(),
            })?;

        let mut patched = self.doc.connections[pos].clone();
        if let Some(from) = patch.from {
            patched.from = from;
        }
        if let Some(to) = patch.to {
            // Switching to a device destination retires the external label
            patched.to = Some(to);
            patched.external_dest = String::new();
            patched.is_wall_jack = false;
        }
        if let Some(dest) = patch.external_dest {
            if !dest.is_empty() {
                patched.to = None;
            }
            patched.external_dest = dest;
        }
        if let Some(wall) = patch.is_wall_jack {
            patched.is_wall_jack = wall;
        }
        if let Some(p) = patch.from_port {
            patched.from_port = Some(p);
        }
        if let Some(p) = patch.to_port {
            patched.to_port = Some(p);
        }
        if let Some(t) = patch.conn_type {
            patched.conn_type = t.to_lowercase();
        }
        if let Some(s) = patch.status {
            patched.status = s.to_lowercase();
        }
        if let Some(c) = patch.cable_color {
            patched.cable_color = Some(c);
        }
        if let Some(m) = patch.cable_marker {
            patched.cable_marker = Some(m.to_uppercase());
        }
        if let Some(v) = patch.via_label {
            patched.via_label = if v.is_empty() { None } else { Some(v) };
        }

        if patched.to.is_none() && patched.external_dest.is_empty() {
            return Err(StoreError::InvalidEndpoint(
                "update would leave the connection without a destination".into(),
            ));
        }
        if self.doc.get_device(patched.from).is_none() {
            return Err(StoreError::NotFound {
                kind: "device",
                id: patched.from.to_string(),
            });
        }
        if let Some(to) = patched.to {
            if self.doc.get_device(to).is_none() {
                return Err(StoreError::NotFound {
                    kind: "device",
                    id: to.to_string(),
                });
            }
        }

        self.doc.connections[pos] = patched;
        self.rebuild_graph();
        Ok(())
    }

    /// Delete a connection. Connections are leaves; nothing cascades.
    pub fn delete_connection(
        &mut self,
        id: &ConnId,
    ) -> std::result::Result<Connection, StoreError> {
        let pos = self
            .doc
            .connections
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "connection",
                id: id.to_string(),
            })?;
        let removed = self.doc.connections.remove(pos);
        self.rebuild_graph();
        Ok(removed)
    }

    // =========================================================================
    // Site / location operations
    // =========================================================================

    /// Add a site; making it the default clears the flag on every other site
    pub fn add_site(&mut self, name: &str, is_default: bool) -> u32 {
        let id = self.doc.sites.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        if is_default {
            for site in &mut self.doc.sites {
                site.is_default = false;
            }
        }
        self.doc.sites.push(Site {
            id,
            name: name.to_string(),
            is_default,
        });
        id
    }

    /// Add a location; the code must be unique within the store
    pub fn add_location(
        &mut self,
        code: &str,
        name: &str,
        site_id: Option<u32>,
        groups: Vec<LocationGroup>,
    ) -> std::result::Result<u32, StoreError> {
        if self.doc.locations.iter().any(|l| l.code == code) {
            return Err(StoreError::Conflict(format!(
                "location code \"{code}\" already exists"
            )));
        }
        let site_id = match site_id {
            Some(sid) => {
                if !self.doc.sites.iter().any(|s| s.id == sid) {
                    return Err(StoreError::NotFound {
                        kind: "site",
                        id: sid.to_string(),
                    });
                }
                sid
            }
            None => self
                .doc
                .sites
                .iter()
                .find(|s| s.is_default)
                .map_or(0, |s| s.id),
        };

        let id = self.doc.next_location_id;
        self.doc.next_location_id = id + 1;
        self.doc.locations.push(Location {
            id,
            code: code.to_string(),
            name: name.to_string(),
            site_id,
            groups,
        });
        Ok(id)
    }

    // =========================================================================
    // Derivations
    // =========================================================================

    /// Group external connections into virtual endpoints: one entry per
    /// distinct (`externalDest`, `isWallJack`) pair. Grouping is exact and
    /// case-sensitive; no trimming, no fuzzy matching.
    #[must_use]
    pub fn resolve_virtual_endpoints(&self) -> Vec<VirtualEndpoint> {
        let mut grouped: BTreeMap<(String, bool), Vec<ConnId>> = BTreeMap::new();
        for conn in &self.doc.connections {
            if conn.is_external() {
                grouped
                    .entry((conn.external_dest.clone(), conn.is_wall_jack))
                    .or_default()
                    .push(conn.id.clone());
            }
        }
        grouped
            .into_iter()
            .map(|((label, is_wall_jack), connections)| VirtualEndpoint {
                label,
                is_wall_jack,
                connections,
            })
            .collect()
    }

    /// Connections failing the destination invariant: no resolvable device
    /// and no external label
    #[must_use]
    pub fn find_orphan_connections(&self) -> Vec<&Connection> {
        self.doc
            .connections
            .iter()
            .filter(|c| match c.to {
                Some(to) => self.doc.get_device(to).is_none(),
                None => c.external_dest.is_empty(),
            })
            .collect()
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Look up a device by id
    #[must_use]
    pub fn get_device(&self, id: u32) -> Option<&Device> {
        self.doc.get_device(id)
    }

    /// All devices
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.doc.devices
    }

    /// All connections
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.doc.connections
    }

    /// All sites
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.doc.sites
    }

    /// All locations
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.doc.locations
    }

    /// Device count
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.doc.devices.len()
    }

    /// Connection count
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.doc.connections.len()
    }

    /// True when the store holds no devices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.devices.is_empty()
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Export to DOT format for Graphviz: one box per device, one dashed box
    /// per virtual endpoint (not one per connection)
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph network {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        for device in &self.doc.devices {
            let label = format!("{}\\n{}", device.name, device.device_type);
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\"];\n",
                device_key(device.id),
                label
            ));
        }

        let endpoints = self.resolve_virtual_endpoints();
        if !endpoints.is_empty() {
            dot.push('\n');
            for ep in &endpoints {
                let shape = if ep.is_wall_jack {
                    "style=dashed"
                } else {
                    "style=dashed, shape=ellipse"
                };
                dot.push_str(&format!(
                    "  \"{}\" [label=\"{}\", {}];\n",
                    endpoint_key(&ep.label, ep.is_wall_jack),
                    ep.label,
                    shape
                ));
            }
        }

        dot.push('\n');
        for conn in &self.doc.connections {
            let target = match conn.to {
                Some(to) => device_key(to),
                None if !conn.external_dest.is_empty() => {
                    endpoint_key(&conn.external_dest, conn.is_wall_jack)
                }
                None => continue,
            };
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                device_key(conn.from),
                target,
                conn.conn_type
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

fn device_key(id: u32) -> String {
    format!("device:{id}")
}

fn endpoint_key(label: &str, is_wall_jack: bool) -> String {
    if is_wall_jack {
        format!("jack:{label}")
    } else {
        format!("ext:{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn two_device_store() -> NetworkTopology {
        let mut store = NetworkTopology::new();
        store.add_device(NewDevice {
            name: "SW1".into(),
            device_type: "switch".into(),
            status: "active".into(),
            ..NewDevice::default()
        });
        store.add_device(NewDevice {
            name: "RT1".into(),
            device_type: "Router".into(),
            status: "ACTIVE".into(),
            ..NewDevice::default()
        });
        store
    }

    #[test]
    fn test_add_device_assigns_sequential_ids() {
        let store = two_device_store();
        assert_eq!(store.devices()[0].id, 1);
        assert_eq!(store.devices()[1].id, 2);
        assert_eq!(store.doc.next_device_id, 3);
        // casefolding happens on entry
        assert_eq!(store.devices()[1].device_type, "router");
        assert_eq!(store.devices()[1].status, "active");
    }

    #[test]
    fn test_add_device_grid_fallback() {
        let store = two_device_store();
        assert_eq!(store.devices()[0].x, Some(50.0));
        assert_eq!(store.devices()[1].x, Some(170.0));
    }

    #[test]
    fn test_counter_bumps_past_imported_ids() {
        let mut store = NetworkTopology::from_json(
            r#"{"devices": [{"id": 41, "name": "OLD", "type": "switch"}],
                "connections": [], "nextDeviceId": 2}"#,
        )
        .unwrap();
        let id = store.add_device(NewDevice {
            name: "NEW".into(),
            ..NewDevice::default()
        });
        assert_eq!(id, 42);
    }

    #[test]
    fn test_add_connection_requires_exactly_one_destination() {
        let mut store = two_device_store();

        let both = store.add_connection(NewConnection {
            from: 1,
            to: Some(2),
            external_dest: Some("Z1".into()),
            ..NewConnection::default()
        });
        assert!(matches!(both, Err(StoreError::InvalidEndpoint(_))));

        let neither = store.add_connection(NewConnection {
            from: 1,
            ..NewConnection::default()
        });
        assert!(matches!(neither, Err(StoreError::InvalidEndpoint(_))));

        assert_eq!(store.connection_count(), 0, "store unchanged on failure");
    }

    #[test]
    fn test_add_connection_checks_endpoints_exist() {
        let mut store = two_device_store();
        let missing = store.add_connection(NewConnection {
            from: 1,
            to: Some(99),
            ..NewConnection::default()
        });
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_identical_cables_get_distinct_ids() {
        let mut store = two_device_store();
        let a = store
            .add_connection(NewConnection {
                from: 1,
                to: Some(2),
                conn_type: "lan".into(),
                status: "active".into(),
                ..NewConnection::default()
            })
            .unwrap();
        let b = store
            .add_connection(NewConnection {
                from: 1,
                to: Some(2),
                conn_type: "lan".into(),
                status: "active".into(),
                ..NewConnection::default()
            })
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete_device_conflicts_when_referenced() {
        let mut store = two_device_store();
        store
            .add_connection(NewConnection {
                from: 1,
                to: Some(2),
                ..NewConnection::default()
            })
            .unwrap();

        let result = store.delete_device(2, false);
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.device_count(), 2);

        let removed = store.delete_device(2, true).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.device_count(), 1);
        assert!(!store.connections().iter().any(|c| c.references(2)));
    }

    #[test]
    fn test_update_connection_switches_destination_kinds() {
        let mut store = two_device_store();
        let id = store
            .add_connection(NewConnection {
                from: 1,
                external_dest: Some("ISP".into()),
                ..NewConnection::default()
            })
            .unwrap();

        store
            .update_connection(
                &id,
                ConnectionPatch {
                    to: Some(2),
                    ..ConnectionPatch::default()
                },
            )
            .unwrap();
        let conn = store.doc.get_connection(&id).unwrap();
        assert_eq!(conn.to, Some(2));
        assert!(conn.external_dest.is_empty());

        store
            .update_connection(
                &id,
                ConnectionPatch {
                    external_dest: Some("Z4".into()),
                    is_wall_jack: Some(true),
                    ..ConnectionPatch::default()
                },
            )
            .unwrap();
        let conn = store.doc.get_connection(&id).unwrap();
        assert_eq!(conn.to, None);
        assert_eq!(conn.external_dest, "Z4");
        assert!(conn.is_wall_jack);
    }

    #[test]
    fn test_update_connection_rejects_empty_destination() {
        let mut store = two_device_store();
        let id = store
            .add_connection(NewConnection {
                from: 1,
                external_dest: Some("ISP".into()),
                ..NewConnection::default()
            })
            .unwrap();
        let result = store.update_connection(
            &id,
            ConnectionPatch {
                external_dest: Some(String::new()),
                ..ConnectionPatch::default()
            },
        );
        assert!(matches!(result, Err(StoreError::InvalidEndpoint(_))));
        // untouched on failure
        assert_eq!(
            store.doc.get_connection(&id).unwrap().external_dest,
            "ISP"
        );
    }

    #[test]
    fn test_virtual_endpoints_group_by_exact_label() {
        let mut store = two_device_store();
        for from in [1, 2] {
            store
                .add_connection(NewConnection {
                    from,
                    external_dest: Some("TIM".into()),
                    ..NewConnection::default()
                })
                .unwrap();
        }
        store
            .add_connection(NewConnection {
                from: 1,
                external_dest: Some("TIM ".into()), // trailing space: distinct
                ..NewConnection::default()
            })
            .unwrap();

        let endpoints = store.resolve_virtual_endpoints();
        assert_eq!(endpoints.len(), 2);
        let tim = endpoints.iter().find(|e| e.label == "TIM").unwrap();
        assert_eq!(tim.connections.len(), 2);
        assert_eq!(
            endpoints.iter().find(|e| e.label == "TIM ").unwrap().connections.len(),
            1
        );
    }

    #[test]
    fn test_wall_jack_and_network_with_same_label_stay_separate() {
        let mut store = two_device_store();
        store
            .add_connection(NewConnection {
                from: 1,
                external_dest: Some("Z1".into()),
                is_wall_jack: true,
                ..NewConnection::default()
            })
            .unwrap();
        store
            .add_connection(NewConnection {
                from: 2,
                external_dest: Some("Z1".into()),
                ..NewConnection::default()
            })
            .unwrap();
        assert_eq!(store.resolve_virtual_endpoints().len(), 2);
    }

    #[test]
    fn test_find_orphan_connections() {
        let store = NetworkTopology::from_json(
            r#"{"devices": [{"id": 1, "name": "SW1", "type": "switch"}],
                "connections": [
                    {"id": "ok", "from": 1, "to": null, "externalDest": "ISP"},
                    {"id": "dangling", "from": 1, "to": null, "externalDest": ""},
                    {"id": "ghost", "from": 1, "to": 99}
                ]}"#,
        )
        .unwrap();
        let orphans = store.find_orphan_connections();
        let ids: Vec<String> = orphans.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["dangling", "ghost"]);
    }

    #[test]
    fn test_from_json_error_taxonomy() {
        assert!(matches!(
            NetworkTopology::from_json("not json"),
            Err(StoreError::Parse(_))
        ));
        assert!(matches!(
            NetworkTopology::from_json(r#"{"devices": []}"#),
            Err(StoreError::Schema(_))
        ));
        assert!(matches!(
            NetworkTopology::from_json(r#"{"devices": {}, "connections": []}"#),
            Err(StoreError::Schema(_))
        ));
        assert!(matches!(
            NetworkTopology::from_json("[1, 2]"),
            Err(StoreError::Schema(_))
        ));
    }

    #[test]
    fn test_add_location_rejects_duplicate_code() {
        let mut store = NetworkTopology::new();
        store.add_site("HQ", true);
        store.add_location("SR", "Server Room", None, Vec::new()).unwrap();
        let dup = store.add_location("SR", "Other", None, Vec::new());
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn test_default_site_assignment() {
        let mut store = NetworkTopology::new();
        let hq = store.add_site("HQ", true);
        store.add_site("Annex", false);
        let id = store.add_location("SR", "Server Room", None, Vec::new()).unwrap();
        let loc = store.locations().iter().find(|l| l.id == id).unwrap();
        assert_eq!(loc.site_id, hq);
    }

    #[test]
    fn test_save_creates_backup_before_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut store = two_device_store();
        store.save(dir.path()).unwrap();
        assert!(dir.path().join(DATA_FILE).exists());
        assert!(!dir.path().join(BACKUP_FILE).exists());

        let first = std::fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
        store.add_device(NewDevice {
            name: "FW1".into(),
            ..NewDevice::default()
        });
        store.save(dir.path()).unwrap();

        let backup = std::fs::read_to_string(dir.path().join(BACKUP_FILE)).unwrap();
        assert_eq!(backup, first, "backup holds the pre-write state");
    }

    #[test]
    fn test_checksum_stable_across_reload() {
        let mut store = two_device_store();
        store
            .add_connection(NewConnection {
                from: 1,
                to: Some(2),
                conn_type: "lan".into(),
                status: "active".into(),
                ..NewConnection::default()
            })
            .unwrap();
        let json = store.to_json().unwrap();
        let reloaded = NetworkTopology::from_json(&json).unwrap();
        assert_eq!(store.checksum().unwrap(), reloaded.checksum().unwrap());
    }

    #[test]
    fn test_neighbors_include_virtual_endpoints() {
        let mut store = two_device_store();
        store
            .add_connection(NewConnection {
                from: 1,
                to: Some(2),
                ..NewConnection::default()
            })
            .unwrap();
        store
            .add_connection(NewConnection {
                from: 1,
                external_dest: Some("Z1".into()),
                is_wall_jack: true,
                ..NewConnection::default()
            })
            .unwrap();
        let neighbors = store.neighbors(1);
        assert!(neighbors.contains(&"device:2".to_string()));
        assert!(neighbors.contains(&"jack:Z1".to_string()));
    }

    #[test]
    fn test_to_dot_draws_one_box_per_virtual_endpoint() {
        let mut store = two_device_store();
        for from in [1, 2] {
            store
                .add_connection(NewConnection {
                    from,
                    external_dest: Some("Z1".into()),
                    is_wall_jack: true,
                    conn_type: "wallport".into(),
                    ..NewConnection::default()
                })
                .unwrap();
        }
        let dot = store.to_dot();
        assert!(dot.contains("digraph network"));
        assert_eq!(dot.matches("\"jack:Z1\" [label=").count(), 1);
        assert_eq!(dot.matches("-> \"jack:Z1\"").count(), 2);
    }
}
