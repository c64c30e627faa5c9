// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error taxonomy for the topology store

use thiserror::Error;

/// Errors returned by store loading and mutation. File-level persistence
/// wraps these in `anyhow` at the command boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The raw document is not valid JSON
    #[error("malformed JSON document")]
    Parse(#[source] serde_json::Error),

    /// The document parses but is missing required structure
    /// (`devices`/`connections` arrays)
    #[error("invalid document shape: {0}")]
    Schema(String),

    /// A referenced entity does not exist
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind (device, connection, site, ...)
        kind: &'static str,
        /// Entity id as given by the caller
        id: String,
    },

    /// The mutation would break referential integrity
    #[error("conflict: {0}")]
    Conflict(String),

    /// A connection spec does not have exactly one destination
    /// (device xor external label)
    #[error("invalid connection endpoint: {0}")]
    InvalidEndpoint(String),
}
