//! HTTP layer: handlers, fallbacks and middleware.

pub mod middleware;
pub mod services;

use actix_web::web;

/// Register every route plus the JSON 404 default service.
///
/// Expects `web::Data<Arc<TrustConfig>>` and `web::Data<Arc<GeoIpProvider>>`
/// to be registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(services::health_routes())
        .service(services::lookup_routes())
        .default_service(web::to(services::not_found));
}
