use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::StaticConfig;
use crate::services::{GeoIpProvider, TrustConfig};

/// Everything built once before the first request is accepted.
///
/// Both members are immutable after construction and shared read-only
/// across worker threads.
pub struct StartupContext {
    pub trust: Arc<TrustConfig>,
    pub geoip: Arc<GeoIpProvider>,
}

/// 准备服务器启动的上下文
/// 包括可信代理配置和 GeoIP 数据库
pub fn prepare_server_startup(config: &StaticConfig) -> StartupContext {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let trust = TrustConfig::from_proxy_config(&config.proxy);
    if trust.trusts_nobody() {
        warn!(
            "Client IP: {}. \
             Set TRUST_PROXY_CIDRS when running behind a reverse proxy.",
            trust.describe()
        );
    } else {
        info!("Client IP: {}", trust.describe());
    }

    let geoip = GeoIpProvider::new(&config.geoip);
    info!("GeoIP: Initialized with {} provider", geoip.provider_name());

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());

    StartupContext {
        trust: Arc::new(trust),
        geoip: Arc::new(geoip),
    }
}
