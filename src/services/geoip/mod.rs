//! GeoIP 服务模块
//!
//! 基于本地 MaxMind GeoLite2-City 数据库的 IP 地理位置查询。
//! 数据库在启动时加载一次，之后只读共享。

mod maxmind;
mod provider;

pub use maxmind::MaxMindProvider;
pub use provider::{CityRecord, GeoIpLookup, GeoIpProvider, LookupError};
