// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Import command - load an exported document, verify its checksum, and
//! replace the stored network

use crate::store::NetworkTopology;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Run the import command
pub fn run(file: &Path, force: bool) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("Malformed JSON in {}", file.display()))?;
    let embedded = value
        .get("__checksum")
        .and_then(|v| v.as_str())
        .map(String::from);

    let mut store = NetworkTopology::from_json(&raw)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    match embedded {
        Some(expected) => {
            let actual = store.checksum()?;
            if actual != expected {
                anyhow::bail!(
                    "Checksum mismatch: the file was modified after export \
                     (expected {expected}, computed {actual})"
                );
            }
            info!("Checksum verified");
        }
        None => {
            warn!("No embedded checksum; skipping integrity verification");
        }
    }

    let report = store.validate();
    if report.has_critical() {
        for entry in &report.critical {
            eprintln!("critical: {entry}");
        }
        anyhow::bail!("Refusing to import a document with critical problems");
    }
    if !report.warning.is_empty() && !force {
        for entry in &report.warning {
            eprintln!("warning: {entry}");
        }
        anyhow::bail!(
            "Document has {} warning(s); re-run with --force to import anyway",
            report.warning.len()
        );
    }

    let data_dir = super::get_data_dir()?;
    store
        .save(&data_dir)
        .with_context(|| format!("Failed to save network to {}", data_dir.display()))?;
    info!(
        "Imported {} device(s) and {} connection(s)",
        store.device_count(),
        store.connection_count()
    );
    Ok(())
}
