pub mod ip;

pub use ip::{TrustedNetwork, canonical_ip, is_public_ip, is_truthy, parse_ip};
