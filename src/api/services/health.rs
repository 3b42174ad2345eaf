use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

/// Health Service
///
/// 只表示进程可以响应请求，不检查 GeoIP 数据库状态。
pub struct HealthService;

impl HealthService {
    pub async fn health_check() -> impl Responder {
        trace!("Received health check request");

        HttpResponse::Ok()
            .append_header(("Content-Type", "text/plain; charset=utf-8"))
            .body("OK")
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Resource {
    web::resource("/health")
        .route(web::get().to(HealthService::health_check))
        .route(web::head().to(HealthService::health_check))
}
