//! ipgeo - client IP geolocation service
//!
//! Resolves the originating client address of an HTTP request, honouring
//! forwarding headers only from trusted proxies, and looks it up in a local
//! MaxMind GeoLite2-City database.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: One-shot command-line tools (default)
//!
//! # Architecture
//! - `services`: trust configuration, client IP resolution, GeoIP lookup
//! - `api`: HTTP handlers and middleware
//! - `config`: Static configuration (TOML + environment)
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup
//! - `utils`: IP address helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
