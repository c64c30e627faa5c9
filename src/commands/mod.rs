// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod connection;
pub mod device;
pub mod endpoints;
pub mod export;
pub mod import;
pub mod location;

use anyhow::Result;
use std::path::PathBuf;

/// Get the data directory
pub(crate) fn get_data_dir() -> Result<PathBuf> {
    let config = crate::config::load()?;
    Ok(config.data_dir)
}
