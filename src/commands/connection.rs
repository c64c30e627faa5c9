// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connection management commands - wire devices to each other and to
//! wall jacks or external networks

use crate::store::{NetworkTopology, NewConnection};
use crate::types::{ConnId, Destination};
use anyhow::{Context, Result};
use tracing::info;

/// Flag arguments for connection actions
pub struct ConnArgs {
    /// Source device id
    pub from: Option<u32>,
    /// Destination device id
    pub to: Option<u32>,
    /// External/wall-jack label
    pub external: Option<String>,
    /// The label names a wall jack
    pub wall_jack: bool,
    /// Source port
    pub from_port: Option<String>,
    /// Destination port
    pub to_port: Option<String>,
    /// Cable/link category
    pub conn_type: String,
    /// Lifecycle tag
    pub status: String,
    /// Cable colour
    pub color: Option<String>,
    /// Cable marker
    pub marker: Option<String>,
    /// Passthrough note
    pub via: Option<String>,
}

/// Run connection command
pub fn run(action: &str, id: Option<String>, args: ConnArgs) -> Result<()> {
    let data_dir = super::get_data_dir()?;
    let mut store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    match action {
        "add" | "new" => {
            let from = args
                .from
                .ok_or_else(|| anyhow::anyhow!("--from <device-id> is required"))?;
            let conn_id = store.add_connection(NewConnection {
                from,
                to: args.to,
                external_dest: args.external,
                is_wall_jack: args.wall_jack,
                from_port: args.from_port,
                to_port: args.to_port,
                conn_type: args.conn_type,
                status: args.status,
                cable_color: args.color,
                cable_marker: args.marker,
                via_label: args.via,
            })?;
            store.save(&data_dir)?;
            info!("Added connection {}", conn_id);
            println!("{conn_id}");
        }
        "rm" | "remove" | "delete" => {
            let raw = id.ok_or_else(|| anyhow::anyhow!("Connection id is required"))?;
            let removed = store.delete_connection(&ConnId::from(raw.as_str()))?;
            store.save(&data_dir)?;
            info!("Deleted connection {}", removed.id);
        }
        "list" | "ls" => {
            if store.connections().is_empty() {
                eprintln!("No connections yet. Run 'cablemap conn add' first.");
                return Ok(());
            }
            for conn in store.connections() {
                let from = store
                    .get_device(conn.from)
                    .map_or_else(|| format!("?{}", conn.from), |d| d.name.clone());
                let dest = match conn.destination() {
                    Some(Destination::Device(to)) => store
                        .get_device(to)
                        .map_or_else(|| format!("?{to}"), |d| d.name.clone()),
                    Some(Destination::WallJack(label)) => format!("jack {label}"),
                    Some(Destination::ExternalNetwork(label)) => format!("ext {label}"),
                    None => "(dangling)".to_string(),
                };
                println!(
                    "{:<14}  {:<20} -> {:<20} {:<8} {}",
                    conn.id, from, dest, conn.conn_type, conn.status
                );
            }
        }
        _ => {
            anyhow::bail!("Unknown action: {}. Use add, rm, list", action);
        }
    }

    Ok(())
}
