use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::{IpGeoError, Result};
use crate::services::client_ip::{RequestSignals, resolve_client_ip, validate_ip};
use crate::services::{CityRecord, GeoIpProvider, TrustConfig};

/// `GET /` 成功时的响应体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    pub ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub iso_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl LookupResponse {
    pub fn new(ip: String, record: CityRecord) -> Self {
        Self {
            ip,
            country: record.country,
            city: record.city,
            iso_code: record.iso_code,
            latitude: record.latitude,
            longitude: record.longitude,
            timezone: record.time_zone,
        }
    }
}

/// `{"error": "..."}` 响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

pub fn json_error(status: StatusCode, message: &'static str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

pub fn error_response(err: &IpGeoError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_error(status, err.client_message())
}

/// 查询一次请求对应的地理位置
///
/// 顺序：数据库可用性 → 解析客户端 IP → 严格校验 → 查库。
pub async fn locate(
    signals: &RequestSignals,
    trust: &TrustConfig,
    geoip: &GeoIpProvider,
) -> Result<LookupResponse> {
    if !geoip.is_available() {
        return Err(IpGeoError::database_unavailable("GeoIP reader not initialized"));
    }

    let raw_ip = resolve_client_ip(signals, trust);
    let ip = validate_ip(&raw_ip)
        .ok_or_else(|| IpGeoError::invalid_address(format!("rejected client IP '{}'", raw_ip)))?;

    let record = geoip.lookup_city(&ip).await?;
    Ok(LookupResponse::new(ip, record))
}

pub struct LookupService;

impl LookupService {
    pub async fn lookup(
        req: HttpRequest,
        trust: web::Data<Arc<TrustConfig>>,
        geoip: web::Data<Arc<GeoIpProvider>>,
    ) -> HttpResponse {
        let signals = RequestSignals::from_request(&req);

        match locate(&signals, &trust, &geoip).await {
            Ok(body) => HttpResponse::Ok().json(body),
            Err(e) => {
                match &e {
                    IpGeoError::Lookup(_) => error!("Unhandled error during GeoIP lookup: {}", e),
                    IpGeoError::DatabaseUnavailable(_) => {}
                    _ => debug!("GeoIP lookup rejected: {}", e),
                }
                error_response(&e)
            }
        }
    }
}

/// Lookup 路由配置
pub fn lookup_routes() -> actix_web::Resource {
    web::resource("/").route(web::get().to(LookupService::lookup))
}
