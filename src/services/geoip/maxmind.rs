//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 MaxMind GeoLite2-City.mmdb 文件进行 IP 地理位置查询

use std::net::IpAddr;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::{CityRecord, GeoIpLookup, LookupError};

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    reader: Reader<Vec<u8>>,
}

impl MaxMindProvider {
    /// 从文件路径创建 MaxMind Provider
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }

    fn lookup_sync(&self, ip: &str) -> Result<CityRecord, LookupError> {
        let ip_addr: IpAddr = ip
            .parse()
            .map_err(|_| LookupError::Failed(format!("not an IP address: {}", ip)))?;

        let result = self
            .reader
            .lookup(ip_addr)
            .map_err(|e| LookupError::Failed(e.to_string()))?;

        // 没有记录时 decode 返回 Ok(None)
        let city: maxminddb::geoip2::City = result
            .decode()
            .map_err(|e| LookupError::Failed(e.to_string()))?
            .ok_or(LookupError::NotFound)?;

        // 新版 API: 字段直接访问，不再是 Option
        let record = CityRecord {
            country: city.country.names.english.map(String::from),
            iso_code: city.country.iso_code.map(String::from),
            city: city.city.names.english.map(String::from),
            latitude: city.location.latitude,
            longitude: city.location.longitude,
            time_zone: city.location.time_zone.map(String::from),
        };

        trace!(
            "MaxMind lookup for {}: country={:?}, city={:?}",
            ip, record.iso_code, record.city
        );

        Ok(record)
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup_city(&self, ip: &str) -> Result<CityRecord, LookupError> {
        self.lookup_sync(ip)
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
