use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::policy::PolicyError;
use crate::server::AppState;

/// Reject requests whose `Authorization` header is not exactly the shared secret.
pub(crate) async fn require_shared_secret(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let supplied = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .map(|v| v.as_bytes());

    if supplied == Some(state.config.api_secret.as_bytes()) {
        return next.run(req).await;
    }

    let remote_ip = remote_ip(&req);
    tracing::info!(
        %remote_ip,
        header_present = supplied.is_some(),
        path = %req.uri().path(),
        "unauthorized access attempt"
    );
    PolicyError::Unauthorized.into_response()
}

/// Client address: first `x-forwarded-for` hop, else the socket peer.
pub(crate) fn remote_ip(req: &Request<Body>) -> String {
    if let Some(ip) = forwarded_client_ip(req.headers()) {
        return ip;
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
