//! IP 地址处理工具
//!
//! 提供客户端 IP 解析所需的基础能力：
//! - 严格的 IP 字面量解析与规范化
//! - 公网 / 非公网地址分类
//! - 非严格 CIDR 解析（主机位自动掩码）与成员判断

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// 环境变量中视为"真"的取值（比较前先 trim 并转小写）
pub const TRUTHY_VALUES: [&str; 4] = ["1", "true", "yes", "on"];

/// 判断一个布尔型环境变量取值是否为真
pub fn is_truthy(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    TRUTHY_VALUES.contains(&normalized.as_str())
}

/// 将字符串解析为 IP 地址
///
/// 会先去除首尾空白；空字符串或非法字面量返回 `None`。
pub fn parse_ip(raw: &str) -> Option<IpAddr> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<IpAddr>().ok()
}

/// 规范化 IP 字符串（例如 IPv6 的零压缩、小写）
pub fn canonical_ip(raw: &str) -> Option<String> {
    parse_ip(raw).map(|ip| ip.to_string())
}

/// 检查 IP 是否为公网地址
///
/// 私有、回环、链路本地、组播、保留以及未指定地址都不算公网地址。
/// IPv4-mapped IPv6 地址按内嵌的 IPv4 地址分类。
pub fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public_v4(&v4),
            None => is_public_v6(v6),
        },
    }
}

fn is_public_v4(ip: &Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    let reserved = a == 0 // 0.0.0.0/8 "本网络"
        || a >= 240 // 240.0.0.0/4 保留段（含广播地址）
        || (a == 192 && b == 0 && c == 0) // 192.0.0.0/24 协议分配
        || (a == 198 && (b & 0xfe) == 18); // 198.18.0.0/15 基准测试

    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_unspecified()
        || reserved)
}

fn is_public_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    let reserved = (first & 0xff00) == 0x0000 // ::/8
        || (first & 0xffc0) == 0xfec0 // fec0::/10 已废弃的站点本地地址
        || ip.segments()[..4] == [0x0100, 0, 0, 0]; // 100::/64 丢弃前缀

    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || (first & 0xfe00) == 0xfc00 // fc00::/7 (ULA)
        || (first & 0xffc0) == 0xfe80 // fe80::/10 (Link-local)
        || reserved)
}

/// CIDR 解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrParseError(String);

impl fmt::Display for CidrParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CIDR '{}'", self.0)
    }
}

impl std::error::Error for CidrParseError {}

/// 一个可信网段
///
/// 以非严格模式解析：前缀之外的主机位会被直接清零，而不是报错，
/// 因此 `10.1.2.3/8` 等价于 `10.0.0.0/8`。没有前缀的单个地址视为
/// `/32`（IPv4）或 `/128`（IPv6）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedNetwork {
    network: IpAddr,
    prefix_len: u8,
}

impl TrustedNetwork {
    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// 检查 IP 是否落在该网段内（IPv4 与 IPv6 互不匹配）
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (ip, self.network) {
            (IpAddr::V4(ip), IpAddr::V4(net)) => {
                let mask = v4_mask(self.prefix_len);
                (u32::from(*ip) & mask) == u32::from(net)
            }
            (IpAddr::V6(ip), IpAddr::V6(net)) => {
                let mask = v6_mask(self.prefix_len);
                (u128::from(*ip) & mask) == u128::from(net)
            }
            _ => false,
        }
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0)
}

fn v6_mask(prefix_len: u8) -> u128 {
    u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0)
}

impl FromStr for TrustedNetwork {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let err = || CidrParseError(value.to_string());

        let (addr, prefix) = match value.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (value, None),
        };

        let addr: IpAddr = addr.parse().map_err(|_| err())?;
        let max_len: u8 = if addr.is_ipv4() { 32 } else { 128 };

        let prefix_len = match prefix {
            None => max_len,
            Some(p) => {
                // 只接受纯十进制数字，拒绝 "+8"、"" 之类的写法
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                match p.parse::<u8>() {
                    Ok(len) if len <= max_len => len,
                    _ => return Err(err()),
                }
            }
        };

        let network = match addr {
            IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(u32::from(v4) & v4_mask(prefix_len))),
            IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(u128::from(v6) & v6_mask(prefix_len))),
        };

        Ok(Self {
            network,
            prefix_len,
        })
    }
}

impl fmt::Display for TrustedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}
