//! HTTP API tests
//!
//! Runs the real route table against a mock GeoIP backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::Value;

use ipgeo::api::configure;
use ipgeo::api::middleware::RequestIdMiddleware;
use ipgeo::api::services::json_error_handlers;
use ipgeo::services::{
    CityRecord, GeoIpLookup, GeoIpProvider, LookupError, RequestSignals, TrustConfig,
    build_trust_config, resolve_client_ip,
};

// =============================================================================
// Test Setup
// =============================================================================

/// Mock GeoIP backend keyed by canonical IP string
struct MockGeoIp {
    records: HashMap<String, CityRecord>,
    failing: Vec<String>,
}

impl MockGeoIp {
    fn new() -> Self {
        let mut records = HashMap::new();
        records.insert(
            "203.0.113.7".to_string(),
            CityRecord {
                country: Some("Australia".to_string()),
                iso_code: Some("AU".to_string()),
                city: Some("Sydney".to_string()),
                latitude: Some(-33.8688),
                longitude: Some(151.2093),
                time_zone: Some("Australia/Sydney".to_string()),
            },
        );
        records.insert(
            "2001:db8::1".to_string(),
            CityRecord {
                country: Some("Germany".to_string()),
                iso_code: Some("DE".to_string()),
                ..Default::default()
            },
        );
        Self {
            records,
            failing: vec!["198.51.100.66".to_string()],
        }
    }
}

#[async_trait]
impl GeoIpLookup for MockGeoIp {
    async fn lookup_city(&self, ip: &str) -> Result<CityRecord, LookupError> {
        if self.failing.iter().any(|f| f == ip) {
            return Err(LookupError::Failed("corrupt record".to_string()));
        }
        self.records.get(ip).cloned().ok_or(LookupError::NotFound)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn peer(addr: &str) -> SocketAddr {
    format!("{}:40000", addr).parse().unwrap()
}

macro_rules! init_app {
    ($trust:expr, $geoip:expr) => {
        test::init_service(
            App::new()
                .wrap(json_error_handlers())
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new(Arc::new($trust)))
                .app_data(web::Data::new(Arc::new($geoip)))
                .configure(configure),
        )
        .await
    };
}

fn mock_provider() -> GeoIpProvider {
    GeoIpProvider::from_lookup(Arc::new(MockGeoIp::new()))
}

// =============================================================================
// Health
// =============================================================================

#[actix_rt::test]
async fn health_returns_ok() {
    let app = init_app!(TrustConfig::default(), GeoIpProvider::unavailable("none"));

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body = test::read_body(resp).await;
    assert_eq!(body, "OK");
}

// =============================================================================
// Lookup
// =============================================================================

#[actix_rt::test]
async fn lookup_with_explicit_ip() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/?ip=203.0.113.7")
        .peer_addr(peer("8.8.8.8"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["ip"], "203.0.113.7");
    assert_eq!(json["country"], "Australia");
    assert_eq!(json["city"], "Sydney");
    assert_eq!(json["iso_code"], "AU");
    assert_eq!(json["timezone"], "Australia/Sydney");
    assert!(json["latitude"].is_number());
    assert!(json["longitude"].is_number());
}

#[actix_rt::test]
async fn repeated_ip_param_uses_first_value() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    // 直连地址不在库里；若 ?ip= 被丢弃会得到 404
    let req = TestRequest::get()
        .uri("/?ip=203.0.113.7&ip=8.8.8.8")
        .peer_addr(peer("198.51.100.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["ip"], "203.0.113.7");
}

#[test]
fn request_signals_keep_first_ip_param() {
    let req = TestRequest::get()
        .uri("/?ip=203.0.113.7&ip=8.8.8.8")
        .peer_addr(peer("198.51.100.1"))
        .to_http_request();
    let signals = RequestSignals::from_request(&req);

    assert_eq!(signals.explicit_ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(signals.peer_addr.as_deref(), Some("198.51.100.1"));
    assert_eq!(
        resolve_client_ip(&signals, &TrustConfig::default()),
        "203.0.113.7"
    );
}

#[actix_rt::test]
async fn lookup_canonicalizes_explicit_ipv6() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/?ip=2001:DB8:0:0::1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["ip"], "2001:db8::1");
    assert!(json["city"].is_null());
}

#[actix_rt::test]
async fn lookup_through_trusted_proxy() {
    let app = init_app!(build_trust_config("10.0.0.0/8", "", "", ""), mock_provider());

    let req = TestRequest::get()
        .uri("/")
        .peer_addr(peer("10.1.2.3"))
        .insert_header(("X-Forwarded-For", "10.0.0.5, 203.0.113.7, 198.51.100.9"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["ip"], "203.0.113.7");
}

#[actix_rt::test]
async fn spoofed_headers_from_untrusted_peer_are_ignored() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/")
        .peer_addr(peer("192.0.2.200"))
        .insert_header(("CF-Connecting-IP", "203.0.113.7"))
        .insert_header(("X-Forwarded-For", "203.0.113.7"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // 直连地址不在库里，说明转发头没有被采用
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "IP address not found in GeoIP database.");
}

#[actix_rt::test]
async fn invalid_explicit_ip_is_bad_request() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/?ip=999.1.1.1")
        .peer_addr(peer("203.0.113.7"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Invalid or missing IP address.");
}

#[actix_rt::test]
async fn missing_peer_is_bad_request() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    // TestRequest 默认没有 peer 地址
    let req = TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn unavailable_database_is_server_error() {
    let app = init_app!(TrustConfig::default(), GeoIpProvider::unavailable("missing"));

    let req = TestRequest::get()
        .uri("/?ip=203.0.113.7")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // JSON 错误体不会被通用 500 处理器覆盖
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "GeoIP database is not available on the server.");
}

#[actix_rt::test]
async fn lookup_failure_is_generic_server_error() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/?ip=198.51.100.66")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Internal server error.");
}

// =============================================================================
// Fallbacks
// =============================================================================

#[actix_rt::test]
async fn unknown_route_is_json_not_found() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get().uri("/does/not/exist").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["error"], "Not found.");
}

#[actix_rt::test]
async fn inbound_request_id_is_echoed() {
    let app = init_app!(TrustConfig::default(), mock_provider());

    let req = TestRequest::get()
        .uri("/health")
        .insert_header(("X-Request-ID", "edge-1234"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "edge-1234"
    );
}
