//! Request logging middleware.
//!
//! Wraps each request in an `http_request` span carrying the request id, so
//! service logs emitted while handling it are correlated.

use super::request_id::RequestId;
use axum::{body::Body, extract::Request, http::Response, middleware::Next};
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

/// Log one line per request at a level chosen by the response status
pub async fn logging_middleware(req: Request, next: Next) -> Response<Body> {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.as_str())
        .unwrap_or("-");
    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = started.elapsed().as_millis() as u64;

        match status {
            500.. => error!(status, latency_ms, "Request failed"),
            400..=499 => warn!(status, latency_ms, "Request rejected"),
            _ => info!(status, latency_ms, "Request completed"),
        }

        response
    }
    .instrument(span)
    .await
}
