use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::extract::USER_ID_HEADER;

/// Request logging middleware
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        user_id = %user_id,
        status = %status,
        duration_ms = %duration.as_millis(),
        "Request processed"
    );

    response
}
