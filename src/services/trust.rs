//! Trusted proxy configuration
//!
//! Turns the raw, string-typed proxy settings into a [`TrustConfig`] once at
//! startup. The result is immutable and shared read-only by every request
//! handler, so no locking is involved.

use tracing::{debug, warn};

use crate::config::ProxyConfig;
use crate::utils::ip::{TrustedNetwork, is_truthy};

/// Which upstream proxies are allowed to supply forwarded-client-IP headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustConfig {
    /// Forwarding headers are trusted unconditionally (`TRUST_PROXY_HEADERS`).
    pub explicit_trust: bool,
    /// Running on a managed platform that always fronts us with its own edge.
    pub platform_trust: bool,
    /// Peers inside any of these networks are trusted proxies.
    pub trusted_networks: Vec<TrustedNetwork>,
}

impl TrustConfig {
    pub fn from_proxy_config(proxy: &ProxyConfig) -> Self {
        build_trust_config(
            &proxy.trusted_cidrs,
            &proxy.trust_headers,
            &proxy.platform_flag,
            &proxy.platform_external_url,
        )
    }

    /// True when forwarding headers can never be honoured.
    pub fn trusts_nobody(&self) -> bool {
        !self.explicit_trust && !self.platform_trust && self.trusted_networks.is_empty()
    }

    /// One-line description for the startup log.
    pub fn describe(&self) -> String {
        if self.explicit_trust {
            return "forwarding headers trusted unconditionally (TRUST_PROXY_HEADERS)".to_string();
        }
        if self.platform_trust {
            return "managed platform detected, trusting the platform edge".to_string();
        }
        if self.trusted_networks.is_empty() {
            return "no trusted proxies, forwarding headers are ignored".to_string();
        }
        let networks: Vec<String> = self
            .trusted_networks
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("trusted proxy networks: {}", networks.join(", "))
    }
}

/// Build the trust configuration from its raw settings.
///
/// Never fails. Invalid CIDR entries are logged and skipped; in the worst
/// case the result trusts nobody and forwarding headers are ignored.
pub fn build_trust_config(
    cidr_list: &str,
    header_flag: &str,
    platform_flag: &str,
    platform_url: &str,
) -> TrustConfig {
    let trusted_networks = parse_trusted_networks(cidr_list);
    let explicit_trust = is_truthy(header_flag);
    let platform_trust = is_truthy(platform_flag) || !platform_url.trim().is_empty();

    debug!(
        "Trust config built: explicit={}, platform={}, networks={}",
        explicit_trust,
        platform_trust,
        trusted_networks.len()
    );

    TrustConfig {
        explicit_trust,
        platform_trust,
        trusted_networks,
    }
}

/// Parse a comma separated CIDR list, keeping the order of valid entries.
pub fn parse_trusted_networks(cidr_list: &str) -> Vec<TrustedNetwork> {
    cidr_list
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<TrustedNetwork>() {
            Ok(network) => Some(network),
            Err(e) => {
                warn!("Ignoring invalid TRUST_PROXY_CIDRS entry: {} ({})", entry, e);
                None
            }
        })
        .collect()
}
