// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Device management commands - add, update, and remove inventory devices

use crate::store::{DevicePatch, NetworkTopology, NewDevice};
use anyhow::{Context, Result};
use tracing::info;

/// Flag arguments shared across device actions
pub struct DeviceArgs {
    /// Category tag
    pub device_type: String,
    /// Lifecycle tag
    pub status: String,
    /// Physical location
    pub location: String,
    /// Rack identifier
    pub rack: Option<String>,
    /// Rear-of-rack mounting
    pub rear: bool,
    /// New name (update)
    pub name: Option<String>,
    /// Delete referencing connections too (rm)
    pub cascade: bool,
}

/// Run device command
pub fn run(action: &str, target: Option<String>, args: DeviceArgs) -> Result<()> {
    let data_dir = super::get_data_dir()?;
    let mut store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    match action {
        "add" | "new" => {
            let name = target.ok_or_else(|| anyhow::anyhow!("Device name is required"))?;
            let id = store.add_device(NewDevice {
                name: name.clone(),
                device_type: args.device_type,
                status: args.status,
                location: args.location,
                rack_id: args.rack,
                is_rear: if args.rear { Some(true) } else { None },
                ..NewDevice::default()
            });
            store.save(&data_dir)?;
            info!("Added device {} ({})", name, id);
            println!("{id}");
        }
        "update" | "set" => {
            let id = parse_device_id(target)?;
            store.update_device(
                id,
                DevicePatch {
                    name: args.name,
                    device_type: flag_or_none(&args.device_type, "other"),
                    status: flag_or_none(&args.status, "active"),
                    location: flag_or_none(&args.location, ""),
                    rack_id: args.rack,
                    is_rear: if args.rear { Some(true) } else { None },
                    ..DevicePatch::default()
                },
            )?;
            store.save(&data_dir)?;
            info!("Updated device {}", id);
        }
        "rm" | "remove" | "delete" => {
            let id = parse_device_id(target)?;
            let removed = store.delete_device(id, args.cascade)?;
            store.save(&data_dir)?;
            if removed > 0 {
                info!("Deleted device {} and {} connection(s)", id, removed);
            } else {
                info!("Deleted device {}", id);
            }
        }
        "show" | "info" => {
            let id = parse_device_id(target)?;
            let device = store
                .get_device(id)
                .ok_or_else(|| anyhow::anyhow!("Device not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(device)?);
            let neighbors = store.neighbors(id);
            if !neighbors.is_empty() {
                println!("connected: {}", neighbors.join(", "));
            }
        }
        "list" | "ls" => {
            if store.is_empty() {
                eprintln!("No devices yet. Run 'cablemap device add <name>' first.");
                return Ok(());
            }
            for device in store.devices() {
                let rack = device.rack_id.as_deref().unwrap_or("-");
                println!(
                    "{:>4}  {:<24} {:<12} {:<10} {:<16} {}",
                    device.id, device.name, device.device_type, device.status, device.location,
                    rack
                );
            }
        }
        _ => {
            anyhow::bail!("Unknown action: {}. Use add, update, rm, show, list", action);
        }
    }

    Ok(())
}

/// Treat a flag left at its clap default as "not given" when updating
fn flag_or_none(value: &str, default: &str) -> Option<String> {
    if value == default {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_device_id(target: Option<String>) -> Result<u32> {
    let raw = target.ok_or_else(|| anyhow::anyhow!("Device id is required"))?;
    raw.parse()
        .with_context(|| format!("Invalid device id: {raw}"))
}
