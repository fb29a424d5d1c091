//! Request logging middleware

use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Requests slower than this are logged as warnings
const SLOW_REQUEST: Duration = Duration::from_millis(250);

/// Log method, path, status and latency of every request
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let caller = request
        .headers()
        .get(crate::actor::USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if duration > SLOW_REQUEST {
        tracing::warn!(%method, %uri, ?duration, "Slow request");
    }
    tracing::info!(
        %method,
        %uri,
        caller = %caller,
        status = response.status().as_u16(),
        elapsed_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}
