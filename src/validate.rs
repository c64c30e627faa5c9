// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document validation - referential integrity and data-quality checks.
//!
//! Validation never rejects a document; it reports findings in three
//! severity buckets and leaves the decision to the caller. Structural
//! corruption (not-even-a-document) is handled earlier, at load time.

use crate::types::{NetworkDoc, CONNECTION_FORBIDDEN_KEYS, DEVICE_FORBIDDEN_KEYS};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Validation findings grouped by severity
#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    /// Referential/integrity violations; the document must not be persisted
    /// to a destination that requires a clean store
    pub critical: Vec<String>,
    /// Data-quality issues; non-blocking
    pub warning: Vec<String>,
    /// Legacy fields that survived past normalization (a store that
    /// bypassed `normalize`, e.g. a raw import)
    pub deprecated: Vec<String>,
}

impl ValidationReport {
    /// True when no bucket has any entry
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.critical.is_empty() && self.warning.is_empty() && self.deprecated.is_empty()
    }

    /// True when the critical bucket is non-empty
    #[must_use]
    pub fn has_critical(&self) -> bool {
        !self.critical.is_empty()
    }

    /// Total finding count across all buckets
    #[must_use]
    pub fn total(&self) -> usize {
        self.critical.len() + self.warning.len() + self.deprecated.len()
    }
}

/// Run the full rule set against a document
#[must_use]
pub fn validate(doc: &NetworkDoc) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_devices(doc, &mut report);
    check_connections(doc, &mut report);
    check_locations(doc, &mut report);
    check_counters(doc, &mut report);
    check_deprecated(doc, &mut report);

    report
}

fn check_devices(doc: &NetworkDoc, report: &mut ValidationReport) {
    let mut seen_ids: HashSet<u32> = HashSet::new();
    for device in &doc.devices {
        if device.id == 0 {
            report
                .critical
                .push(format!("device \"{}\": missing id", device.name));
        } else if !seen_ids.insert(device.id) {
            report
                .critical
                .push(format!("duplicate device id: {}", device.id));
        }
        if device.name.is_empty() {
            report
                .critical
                .push(format!("device {}: missing name", device.id));
        }

        if device.device_type.is_empty() {
            report
                .warning
                .push(format!("device {}: missing type", device.id));
        }
        if device.status.is_empty() {
            report
                .warning
                .push(format!("device {}: missing status", device.id));
        }
        if device.location.is_empty() {
            report
                .warning
                .push(format!("device {}: missing location", device.id));
        }
        if device.addresses.is_empty() && device.ports.is_empty() {
            report.warning.push(format!(
                "device {}: no addresses or ports (passive device?)",
                device.id
            ));
        }
    }
}

fn check_connections(doc: &NetworkDoc, report: &mut ValidationReport) {
    let device_ids: HashSet<u32> = doc.devices.iter().map(|d| d.id).collect();
    // Device names lowercased for the corruption heuristic below
    let names: Vec<(String, u32)> = doc
        .devices
        .iter()
        .filter(|d| !d.name.is_empty())
        .map(|d| (d.name.to_lowercase(), d.id))
        .collect();

    let mut seen_ids = HashSet::new();
    for conn in &doc.connections {
        if conn.id.is_empty() {
            report.critical.push(format!(
                "connection from device {}: missing id",
                conn.from
            ));
        } else if !seen_ids.insert(conn.id.clone()) {
            report
                .critical
                .push(format!("duplicate connection id: {}", conn.id));
        }

        if conn.from == 0 {
            report
                .critical
                .push(format!("connection {}: missing 'from' device", conn.id));
        } else if !device_ids.contains(&conn.from) {
            report.critical.push(format!(
                "connection {}: 'from' device {} does not exist",
                conn.id, conn.from
            ));
        }

        match conn.to {
            Some(to) => {
                if !device_ids.contains(&to) {
                    report.critical.push(format!(
                        "connection {}: 'to' device {} does not exist",
                        conn.id, to
                    ));
                }
                // Exactly-one-destination rule: a resolvable device AND an
                // external label is an ambiguous legacy state
                if !conn.external_dest.is_empty() {
                    report.critical.push(format!(
                        "connection {}: has both 'to' ({}) and externalDest \"{}\" - use viaLabel for passthrough notes",
                        conn.id, to, conn.external_dest
                    ));
                }
            }
            None => {
                if conn.external_dest.is_empty() {
                    report.critical.push(format!(
                        "connection {}: dangling - 'to' is null and externalDest is empty",
                        conn.id
                    ));
                } else if !conn.is_wall_jack {
                    // Heuristic from the field: an external label that names
                    // an existing device usually means the record should use
                    // 'to' instead. Warn, never auto-repair.
                    let dest = conn.external_dest.to_lowercase();
                    if let Some((name, id)) = names
                        .iter()
                        .find(|(n, _)| *n == dest || n.contains(&dest) || dest.contains(n))
                    {
                        report.warning.push(format!(
                            "connection {}: externalDest \"{}\" matches device \"{}\" (id {}) - should it use 'to'?",
                            conn.id, conn.external_dest, name, id
                        ));
                    }
                }
            }
        }

        if conn.conn_type.is_empty() {
            report
                .warning
                .push(format!("connection {}: missing type", conn.id));
        }
        if conn.status.is_empty() {
            report
                .warning
                .push(format!("connection {}: missing status", conn.id));
        }
    }
}

fn check_locations(doc: &NetworkDoc, report: &mut ValidationReport) {
    let mut seen_codes: HashMap<&str, u32> = HashMap::new();
    for location in &doc.locations {
        if let Some(other) = seen_codes.insert(location.code.as_str(), location.id) {
            report.critical.push(format!(
                "duplicate location code \"{}\" (locations {} and {})",
                location.code, other, location.id
            ));
        }
    }
}

fn check_counters(doc: &NetworkDoc, report: &mut ValidationReport) {
    if let Some(max_id) = doc.devices.iter().map(|d| d.id).max() {
        if doc.next_device_id <= max_id {
            report.warning.push(format!(
                "nextDeviceId ({}) should be higher than max device id ({})",
                doc.next_device_id, max_id
            ));
        }
    }
}

fn check_deprecated(doc: &NetworkDoc, report: &mut ValidationReport) {
    for device in &doc.devices {
        for key in DEVICE_FORBIDDEN_KEYS {
            if device.extra.contains_key(*key) {
                report.deprecated.push(format!(
                    "device {}: legacy field \"{}\" present (store bypassed normalization?)",
                    device.id, key
                ));
            }
        }
    }
    for conn in &doc.connections {
        for key in CONNECTION_FORBIDDEN_KEYS {
            if conn.extra.contains_key(*key) {
                report.deprecated.push(format!(
                    "connection {}: legacy field \"{}\" present (store bypassed normalization?)",
                    conn.id, key
                ));
            }
        }
    }
}
