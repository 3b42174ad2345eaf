//! 客户端 IP 解析
//!
//! 从一次请求的元数据中选出"客户端"地址。策略（按优先级，先命中者胜出）：
//! 1. `?ip=` 查询参数 → 原样返回，不做校验
//! 2. 直连对端是可信代理时：
//!    - CF-Connecting-IP
//!    - X-Real-IP
//!    - X-Forwarded-For 中第一个公网地址；全是内网地址时取最左边一个
//! 3. 直连对端地址
//! 4. 都没有 → 空字符串（无法确定）
//!
//! 直连对端不可信时，转发头一律忽略，防止客户端伪造自己的 X-Forwarded-For。

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;
use url::form_urlencoded;

use super::trust::TrustConfig;
use crate::utils::ip::{canonical_ip, is_public_ip, parse_ip};

/// X-Forwarded-For 最多解析的条目数，超出部分直接忽略
pub const MAX_FORWARDED_ENTRIES: usize = 32;

pub const HEADER_CONNECTING_IP: &str = "cf-connecting-ip";
pub const HEADER_REAL_IP: &str = "x-real-ip";
pub const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";

/// 单次请求中与客户端 IP 有关的原始信号
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    pub explicit_ip: Option<String>,
    pub peer_addr: Option<String>,
    pub connecting_ip: Option<String>,
    pub real_ip: Option<String>,
    pub forwarded_for: Option<String>,
}

/// 查询串中第一个 `ip` 参数的值
///
/// 重复出现时只取第一个，后面的忽略。
pub fn explicit_ip_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "ip")
        .map(|(_, value)| value.into_owned())
}

impl RequestSignals {
    /// 从 actix 请求中采集信号
    pub fn from_request(req: &HttpRequest) -> Self {
        Self {
            explicit_ip: explicit_ip_param(req.query_string()),
            peer_addr: req.peer_addr().map(|addr| addr.ip().to_string()),
            ..Self::from_headers(req.headers())
        }
    }

    /// 只采集请求头中的信号
    ///
    /// 多个 X-Forwarded-For 头按出现顺序用逗号拼接。
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let single = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        let forwarded: Vec<&str> = headers
            .get_all(HEADER_FORWARDED_FOR)
            .filter_map(|h| h.to_str().ok())
            .collect();

        Self {
            connecting_ip: single(HEADER_CONNECTING_IP),
            real_ip: single(HEADER_REAL_IP),
            forwarded_for: (!forwarded.is_empty()).then(|| forwarded.join(",")),
            ..Self::default()
        }
    }
}

/// 解析步骤，`RESOLVE_ORDER` 给出求值顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStep {
    ExplicitParam,
    ConnectingIp,
    RealIp,
    ForwardedFor,
    PeerAddress,
}

pub const RESOLVE_ORDER: [ResolveStep; 5] = [
    ResolveStep::ExplicitParam,
    ResolveStep::ConnectingIp,
    ResolveStep::RealIp,
    ResolveStep::ForwardedFor,
    ResolveStep::PeerAddress,
];

impl ResolveStep {
    pub fn name(self) -> &'static str {
        match self {
            ResolveStep::ExplicitParam => "query parameter",
            ResolveStep::ConnectingIp => "CF-Connecting-IP",
            ResolveStep::RealIp => "X-Real-IP",
            ResolveStep::ForwardedFor => "X-Forwarded-For",
            ResolveStep::PeerAddress => "peer address",
        }
    }

    /// 该步骤给出的候选值；`None` 表示"没有意见"，交给下一步
    fn candidate(self, ctx: &ResolveContext<'_>) -> Option<String> {
        match self {
            ResolveStep::ExplicitParam => ctx
                .signals
                .explicit_ip
                .as_ref()
                .filter(|ip| !ip.is_empty())
                .cloned(),
            ResolveStep::ConnectingIp if ctx.trusted => {
                ctx.signals.connecting_ip.as_deref().and_then(canonical_ip)
            }
            ResolveStep::RealIp if ctx.trusted => {
                ctx.signals.real_ip.as_deref().and_then(canonical_ip)
            }
            ResolveStep::ForwardedFor if ctx.trusted => ctx
                .signals
                .forwarded_for
                .as_deref()
                .and_then(pick_forwarded_for)
                .map(|ip| ip.to_string()),
            ResolveStep::PeerAddress => ctx.peer.map(|ip| ip.to_string()),
            _ => None,
        }
    }
}

struct ResolveContext<'a> {
    signals: &'a RequestSignals,
    peer: Option<IpAddr>,
    trusted: bool,
}

/// 从 X-Forwarded-For 中挑选客户端地址
///
/// 非法条目被丢弃，其余保持原顺序；优先第一个公网地址，
/// 没有公网地址时退回第一个合法条目。
pub fn pick_forwarded_for(header: &str) -> Option<IpAddr> {
    let candidates: Vec<IpAddr> = header
        .split(',')
        .take(MAX_FORWARDED_ENTRIES)
        .filter_map(parse_ip)
        .collect();

    candidates
        .iter()
        .find(|ip| is_public_ip(ip))
        .or_else(|| candidates.first())
        .copied()
}

/// 检查直连对端是否为可信代理
pub fn is_trusted_proxy(peer: Option<&IpAddr>, config: &TrustConfig) -> bool {
    let Some(peer) = peer else {
        return false;
    };

    config.explicit_trust
        || config.platform_trust
        || config.trusted_networks.iter().any(|net| net.contains(peer))
}

/// 解析客户端 IP，同时返回命中的步骤
pub fn resolve_client_ip_with_step(
    signals: &RequestSignals,
    config: &TrustConfig,
) -> Option<(ResolveStep, String)> {
    let peer = signals.peer_addr.as_deref().and_then(parse_ip);
    let ctx = ResolveContext {
        signals,
        peer,
        trusted: is_trusted_proxy(peer.as_ref(), config),
    };

    RESOLVE_ORDER
        .iter()
        .find_map(|step| step.candidate(&ctx).map(|ip| (*step, ip)))
}

/// 解析客户端 IP
///
/// 返回空字符串表示无法确定。`?ip=` 的值原样返回，是否合法由调用方
/// 通过 [`validate_ip`] 判断。
pub fn resolve_client_ip(signals: &RequestSignals, config: &TrustConfig) -> String {
    match resolve_client_ip_with_step(signals, config) {
        Some((step, ip)) => {
            trace!("Client IP resolved from {}", step.name());
            ip
        }
        None => String::new(),
    }
}

/// 严格校验并规范化客户端 IP
pub fn validate_ip(raw: &str) -> Option<String> {
    canonical_ip(raw)
}
