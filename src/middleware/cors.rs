//! CORS middleware.
//!
//! Every response leaves with the same CORS header set. `OPTIONS` on any path
//! is answered here as a preflight and never reaches a handler. Responses that
//! did not set a content type are marked as JSON, since the API speaks nothing
//! else.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::config::CorsPolicy;

pub const ALLOWED_METHODS: &str = "GET, OPTIONS";

pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = if request.method() == Method::OPTIONS {
        debug!(path = %request.uri().path(), origin = ?origin, "CORS preflight");
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    apply_headers(&policy, origin.as_deref(), response.headers_mut());
    response
}

fn apply_headers(policy: &CorsPolicy, origin: Option<&str>, headers: &mut HeaderMap) {
    match policy {
        CorsPolicy::Any => {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
        }
        CorsPolicy::AllowList(_) => {
            headers.append(header::VARY, HeaderValue::from_static("origin"));
            let allowed = origin
                .filter(|o| policy.allows(o))
                .and_then(|o| HeaderValue::from_str(o).ok());
            if let Some(value) = allowed {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            }
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }
}
