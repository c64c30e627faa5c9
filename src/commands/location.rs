// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Site and location management commands

use crate::store::NetworkTopology;
use anyhow::{Context, Result};
use tracing::info;

/// Run location command
pub fn run(
    action: &str,
    code: Option<String>,
    name: Option<String>,
    site: Option<u32>,
    default: bool,
) -> Result<()> {
    let data_dir = super::get_data_dir()?;
    let mut store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    match action {
        "add" | "new" => {
            let code = code.ok_or_else(|| anyhow::anyhow!("Location code is required"))?;
            let name = name.unwrap_or_else(|| code.clone());
            let id = store.add_location(&code, &name, site, Vec::new())?;
            store.save(&data_dir)?;
            info!("Added location {} ({})", code, id);
            println!("{id}");
        }
        "add-site" => {
            let name = code.ok_or_else(|| anyhow::anyhow!("Site name is required"))?;
            let id = store.add_site(&name, default);
            store.save(&data_dir)?;
            info!("Added site {} ({})", name, id);
            println!("{id}");
        }
        "list" | "ls" => {
            for site in store.sites() {
                let marker = if site.is_default { " (default)" } else { "" };
                println!("site {:>3}  {}{}", site.id, site.name, marker);
            }
            for loc in store.locations() {
                println!(
                    "loc  {:>3}  {:<8} {:<24} site {}",
                    loc.id, loc.code, loc.name, loc.site_id
                );
            }
            if store.sites().is_empty() && store.locations().is_empty() {
                eprintln!("No sites or locations yet.");
            }
        }
        _ => {
            anyhow::bail!("Unknown action: {}. Use add, add-site, list", action);
        }
    }

    Ok(())
}
