// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - exports the network to various formats

use crate::store::NetworkTopology;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Graphviz DOT format
    Dot,
    /// JSON format with embedded checksum
    Json,
}

impl ExportFormat {
    /// Parse format from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(Self::Dot),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Json => "json",
        }
    }
}

/// Run the export command
pub fn run(format: &str, output: Option<PathBuf>) -> Result<()> {
    info!("Exporting to {}", format);

    let export_format = ExportFormat::from_str(format)
        .ok_or_else(|| anyhow::anyhow!("Unknown export format: {}. Supported: json, dot", format))?;

    let data_dir = super::get_data_dir()?;
    let store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    if store.is_empty() {
        eprintln!("Warning: Network is empty. Run 'cablemap device add' first.");
    }

    let content = match export_format {
        ExportFormat::Dot => store.to_dot(),
        ExportFormat::Json => export_json(&store)?,
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Exported to {}", path.display());
        }
        None => {
            std::io::stdout().write_all(content.as_bytes())?;
        }
    }

    Ok(())
}

/// JSON export with the checksum embedded, so the receiving side can verify
/// the document survived the transfer intact
fn export_json(store: &NetworkTopology) -> Result<String> {
    let checksum = store.checksum()?;
    let mut value = serde_json::to_value(&store.doc)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("__checksum".into(), serde_json::Value::String(checksum));
        obj.insert(
            "__checksumAlgorithm".into(),
            serde_json::Value::String("SHA-256".into()),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
