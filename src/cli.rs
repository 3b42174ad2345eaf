//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for ipgeo using clap's derive macros.

use clap::{Parser, Subcommand};

/// ipgeo - client IP geolocation service
#[derive(Parser)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "Resolve the real client IP and look it up in a GeoLite2 database", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Look up one IP address in the configured GeoIP database
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,
    },

    /// Show which address the resolver would pick for a request
    ///
    /// Uses the trusted proxy settings from the loaded configuration.
    Resolve {
        /// Direct peer address of the connection
        #[arg(long)]
        peer: Option<String>,

        /// Explicit `?ip=` query parameter
        #[arg(long)]
        ip: Option<String>,

        /// CF-Connecting-IP header value
        #[arg(long)]
        cf_connecting_ip: Option<String>,

        /// X-Real-IP header value
        #[arg(long)]
        x_real_ip: Option<String>,

        /// X-Forwarded-For header value
        #[arg(long)]
        x_forwarded_for: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
