//! GeoIP Provider 抽象层
//!
//! 启动时根据配置一次性构建：
//! 1. 数据库文件不存在 → 记录一次错误，进入不可用状态
//! 2. 打开失败 → 记录一次错误（附带原因），进入不可用状态
//! 3. 打开成功 → MaxMindProvider
//!
//! 不可用状态下每次查询都直接返回 `DatabaseUnavailable`，不再重复写日志。

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;
use crate::errors::{IpGeoError, Result};

/// 城市级地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityRecord {
    /// 国家英文名
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub iso_code: Option<String>,
    /// 城市英文名
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// IANA 时区，例如 "Asia/Shanghai"
    pub time_zone: Option<String>,
}

/// 查询失败的两类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// 地址合法，但数据库中没有记录
    NotFound,
    /// 其它任何失败
    Failed(String),
}

impl From<LookupError> for IpGeoError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound => IpGeoError::address_not_found("address not in database"),
            LookupError::Failed(msg) => IpGeoError::lookup(msg),
        }
    }
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询一个已经校验过的 IP 地址
    async fn lookup_city(&self, ip: &str) -> std::result::Result<CityRecord, LookupError>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

enum ProviderState {
    Ready(Arc<dyn GeoIpLookup>),
    Unavailable(String),
}

/// 统一 GeoIP Provider
pub struct GeoIpProvider {
    state: ProviderState,
}

impl GeoIpProvider {
    /// 根据 GeoIpConfig 初始化
    pub fn new(config: &GeoIpConfig) -> Self {
        let path = config.database_path.as_str();

        if !Path::new(path).exists() {
            error!("GeoIP database not found at path: {}", path);
            return Self::unavailable(format!("database file not found: {}", path));
        }

        match MaxMindProvider::new(path) {
            Ok(provider) => {
                info!("GeoIP database loaded from {}", path);
                Self::from_lookup(Arc::new(provider))
            }
            Err(e) => {
                error!("Failed to initialize GeoIP reader from {}: {}", path, e);
                Self::unavailable(format!("failed to open {}: {}", path, e))
            }
        }
    }

    /// 使用现成的查询实现（测试或其它数据源）
    pub fn from_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self {
            state: ProviderState::Ready(inner),
        }
    }

    pub fn unavailable<T: Into<String>>(reason: T) -> Self {
        Self {
            state: ProviderState::Unavailable(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ProviderState::Ready(_))
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        match &self.state {
            ProviderState::Ready(inner) => inner.name(),
            ProviderState::Unavailable(_) => "unavailable",
        }
    }

    /// 查询 IP 地址的地理位置
    pub async fn lookup_city(&self, ip: &str) -> Result<CityRecord> {
        match &self.state {
            ProviderState::Ready(inner) => inner.lookup_city(ip).await.map_err(IpGeoError::from),
            ProviderState::Unavailable(reason) => {
                Err(IpGeoError::database_unavailable(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(std::result::Result<CityRecord, LookupError>);

    #[async_trait]
    impl GeoIpLookup for Fixed {
        async fn lookup_city(&self, _ip: &str) -> std::result::Result<CityRecord, LookupError> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_missing_database_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeoIpConfig {
            database_path: dir.path().join("missing.mmdb").display().to_string(),
        };
        let provider = GeoIpProvider::new(&config);
        assert!(!provider.is_available());
        assert_eq!(provider.provider_name(), "unavailable");

        let err = provider.lookup_city("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, IpGeoError::DatabaseUnavailable(_)));
    }

    #[tokio::test]
    async fn test_corrupt_database_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mmdb");
        std::fs::write(&path, b"definitely not a maxmind database").unwrap();

        let provider = GeoIpProvider::new(&GeoIpConfig {
            database_path: path.display().to_string(),
        });
        assert!(!provider.is_available());
    }

    #[tokio::test]
    async fn test_not_found_is_distinct_from_failure() {
        let provider = GeoIpProvider::from_lookup(Arc::new(Fixed(Err(LookupError::NotFound))));
        let err = provider.lookup_city("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, IpGeoError::AddressNotFound(_)));
        assert_eq!(err.status_code(), 404);

        let provider = GeoIpProvider::from_lookup(Arc::new(Fixed(Err(LookupError::Failed(
            "boom".to_string(),
        )))));
        let err = provider.lookup_city("10.0.0.1").await.unwrap_err();
        assert!(matches!(err, IpGeoError::Lookup(_)));
        assert_eq!(err.status_code(), 500);
    }
}
