// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Cablemap CLI - Wiring map for your physical network inventory

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod error;
mod normalize;
mod store;
mod validate;

/// Re-exported so the binary modules share the library's type definitions
mod types {
    pub use cablemap::types::*;
}

#[derive(Parser)]
#[command(name = "cablemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Data directory override
    #[arg(long, env = "CABLEMAP_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage devices
    Device {
        /// Action: add, update, rm, show, list
        action: String,

        /// Device id (update, rm, show) or name (add)
        target: Option<String>,

        /// Device type (switch, router, server, ...)
        #[arg(long, default_value = "other")]
        device_type: String,

        /// Lifecycle status
        #[arg(long, default_value = "active")]
        status: String,

        /// Physical location
        #[arg(long, default_value = "")]
        location: String,

        /// Rack identifier
        #[arg(long)]
        rack: Option<String>,

        /// Mounted on the rear of the rack
        #[arg(long)]
        rear: bool,

        /// New name (update)
        #[arg(long)]
        name: Option<String>,

        /// Delete referencing connections too (rm)
        #[arg(long)]
        cascade: bool,
    },

    /// Manage connections
    Conn {
        /// Action: add, rm, list
        action: String,

        /// Connection id (rm)
        id: Option<String>,

        /// Source device id
        #[arg(long)]
        from: Option<u32>,

        /// Destination device id (device-to-device link)
        #[arg(long)]
        to: Option<u32>,

        /// External/wall-jack label (non-device termination)
        #[arg(long)]
        external: Option<String>,

        /// The external label names a wall jack
        #[arg(long)]
        wall_jack: bool,

        /// Source port
        #[arg(long)]
        from_port: Option<String>,

        /// Destination port
        #[arg(long)]
        to_port: Option<String>,

        /// Cable/link category
        #[arg(long, default_value = "lan")]
        conn_type: String,

        /// Lifecycle status
        #[arg(long, default_value = "active")]
        status: String,

        /// Cable colour (#RRGGBB)
        #[arg(long)]
        color: Option<String>,

        /// Cable marker label
        #[arg(long)]
        marker: Option<String>,

        /// Wall-jack passthrough note for device-to-device links
        #[arg(long)]
        via: Option<String>,
    },

    /// Manage sites and locations
    Location {
        /// Action: add, add-site, list
        action: String,

        /// Location code (add) or site name (add-site)
        code: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Owning site id
        #[arg(long)]
        site: Option<u32>,

        /// Make this the default site (add-site)
        #[arg(long)]
        default: bool,
    },

    /// Validate the stored document and report problems
    Validate {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List virtual endpoints (wall jacks and external networks)
    Endpoints {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the network to various formats
    Export {
        /// Output format (json, dot)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Import a network document, verifying its checksum
    Import {
        /// File to import
        file: std::path::PathBuf,

        /// Import despite validation warnings
        #[arg(long)]
        force: bool,
    },

    /// Get or set configuration
    Config {
        /// Configuration key
        key: String,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config resolution reads the environment, so a --data-dir flag value
    // is forwarded there before any command loads the store
    if let Some(dir) = &cli.data_dir {
        std::env::set_var("CABLEMAP_DATA_DIR", dir);
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Device {
            action,
            target,
            device_type,
            status,
            location,
            rack,
            rear,
            name,
            cascade,
        } => commands::device::run(
            &action,
            target,
            commands::device::DeviceArgs {
                device_type,
                status,
                location,
                rack,
                rear,
                name,
                cascade,
            },
        ),
        Commands::Conn {
            action,
            id,
            from,
            to,
            external,
            wall_jack,
            from_port,
            to_port,
            conn_type,
            status,
            color,
            marker,
            via,
        } => commands::connection::run(
            &action,
            id,
            commands::connection::ConnArgs {
                from,
                to,
                external,
                wall_jack,
                from_port,
                to_port,
                conn_type,
                status,
                color,
                marker,
                via,
            },
        ),
        Commands::Location {
            action,
            code,
            name,
            site,
            default,
        } => commands::location::run(&action, code, name, site, default),
        Commands::Validate { json } => commands::check::run(json, cli.no_color),
        Commands::Endpoints { json } => commands::endpoints::run(json),
        Commands::Export { format, output } => commands::export::run(&format, output),
        Commands::Import { file, force } => commands::import::run(&file, force),
        Commands::Config { key, value } => commands::config::run(&key, value),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
