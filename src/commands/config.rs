// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use anyhow::Result;

pub fn run(key: &str, value: Option<String>) -> Result<()> {
    let config = crate::config::load()?;
    match (key, value) {
        ("data-dir" | "data_dir", None) => {
            println!("{}", config.data_dir.display());
        }
        ("log-level" | "log_level", None) => {
            println!("{}", config.log_level);
        }
        (_, Some(_)) => {
            anyhow::bail!(
                "Configuration is read from the environment; set CABLEMAP_DATA_DIR instead"
            );
        }
        _ => {
            anyhow::bail!("Unknown configuration key: {}. Known: data-dir, log-level", key);
        }
    }
    Ok(())
}
