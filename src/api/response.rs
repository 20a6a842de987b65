use axum::Json;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::models::NewsPayload;
use crate::service::CacheStatus;

pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-news-cache");

/// Successful news body with the shared-cache directive and hit/miss tag.
pub fn news(payload: NewsPayload, status: CacheStatus, cache_control: &str) -> Response {
    let mut response = (StatusCode::OK, Json(payload)).into_response();
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str()));

    response
}

/// Preflight answer: status only, no body.
pub fn preflight() -> Response {
    StatusCode::OK.into_response()
}
