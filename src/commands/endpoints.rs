// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Endpoints command - list the virtual endpoints derived from external
//! connections

use crate::store::NetworkTopology;
use anyhow::{Context, Result};

/// Run the endpoints command
pub fn run(json: bool) -> Result<()> {
    let data_dir = super::get_data_dir()?;
    let store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    let endpoints = store.resolve_virtual_endpoints();

    if json {
        println!("{}", serde_json::to_string_pretty(&endpoints)?);
        return Ok(());
    }

    if endpoints.is_empty() {
        eprintln!("No external connections in the store.");
        return Ok(());
    }

    for ep in &endpoints {
        let kind = if ep.is_wall_jack { "jack" } else { "ext " };
        println!("{kind}  {:<20} {} connection(s)", ep.label, ep.connections.len());
    }
    Ok(())
}
