use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{ApiErrorResponse, ErrorDetail};
use crate::AppState;

const VERSION_HEADER: &str = "x-bookshelf-version";

/// Request processing middleware hook
///
/// Logs every request with its final status and latency.
pub async fn request_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    debug!(%method, %path, "Request received");

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

/// Response processing middleware hook
///
/// Logs error responses and, when the configuration allows it, rewrites
/// their body to include the underlying details.
pub async fn response_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    if let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() {
        if detail.status.is_server_error() {
            error!(%method, %path, status = detail.status.as_u16(), details = %detail.details, "Request failed");
        } else {
            warn!(%method, %path, status = detail.status.as_u16(), message = %detail.message, "Request rejected");
        }

        if state.config.expose_error_details() {
            attach_details(&mut response, detail);
        }
    }

    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static(env!("CARGO_PKG_VERSION")));

    response
}

fn attach_details(response: &mut Response, detail: ErrorDetail) {
    let body = ApiErrorResponse {
        success: false,
        message: detail.message,
        details: Some(detail.details),
    };
    match serde_json::to_vec(&body) {
        Ok(bytes) => {
            response.headers_mut().remove(header::CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => warn!("Could not attach error details: {}", e),
    }
}
