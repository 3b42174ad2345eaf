//! Service layer
//!
//! Request-independent logic shared by the HTTP API and the CLI:
//! trust configuration, client IP resolution and GeoIP lookup.

pub mod client_ip;
pub mod geoip;
pub mod trust;

pub use client_ip::{RequestSignals, ResolveStep, resolve_client_ip, validate_ip};
pub use geoip::{CityRecord, GeoIpLookup, GeoIpProvider, LookupError};
pub use trust::{TrustConfig, build_trust_config};
