// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent data (network.json and its backup)
    pub data_dir: std::path::PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("com", "hyperpolymath", "cablemap")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("~/.local/share/cablemap")),
            log_level: "info".to_string(),
        }
    }
}

/// Resolve configuration: the `CABLEMAP_DATA_DIR` environment variable
/// overrides the platform data directory
pub fn load() -> Result<Config> {
    let mut config = Config::default();
    if let Ok(dir) = std::env::var("CABLEMAP_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = std::path::PathBuf::from(dir);
        }
    }
    Ok(config)
}
