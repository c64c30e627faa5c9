// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Validate command - run the data-integrity rule set and report by severity

use crate::store::NetworkTopology;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Run the validate command. Exits with status 1 when critical problems
/// are found so scripts can gate on it.
pub fn run(json: bool, no_color: bool) -> Result<()> {
    let data_dir = super::get_data_dir()?;
    let store = NetworkTopology::load(&data_dir)
        .with_context(|| format!("Failed to load network from {}", data_dir.display()))?;

    let report = store.validate();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_clean() {
        println!(
            "OK: {} device(s), {} connection(s), no problems found",
            store.device_count(),
            store.connection_count()
        );
    } else {
        for entry in &report.critical {
            if no_color {
                println!("critical: {entry}");
            } else {
                println!("{}: {entry}", "critical".red().bold());
            }
        }
        for entry in &report.warning {
            if no_color {
                println!("warning: {entry}");
            } else {
                println!("{}: {entry}", "warning".yellow());
            }
        }
        for entry in &report.deprecated {
            if no_color {
                println!("deprecated: {entry}");
            } else {
                println!("{}: {entry}", "deprecated".dimmed());
            }
        }
        println!(
            "\n{} critical, {} warning(s), {} deprecated field(s)",
            report.critical.len(),
            report.warning.len(),
            report.deprecated.len()
        );
    }

    if report.has_critical() {
        std::process::exit(1);
    }
    Ok(())
}
