//! JSON responses for requests that no handler produced a body for:
//! unmatched routes and unhandled internal errors.

use actix_web::body::EitherBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, Responder};
use tracing::error;

use super::lookup::json_error;

/// Default service for unmatched routes.
pub async fn not_found() -> impl Responder {
    json_error(StatusCode::NOT_FOUND, "Not found.")
}

/// Rewrites any 500 that isn't already JSON into the generic error body.
pub fn json_error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, internal_error)
}

fn internal_error<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .response()
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));

    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    if let Some(err) = res.response().error() {
        error!("Unhandled internal error: {}", err);
    }

    let (req, _) = res.into_parts();
    let response: HttpResponse =
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.");
    let res: ServiceResponse<EitherBody<B>> =
        ServiceResponse::new(req, response).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
