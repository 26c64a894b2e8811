use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

/// Logs the body of every server-error response before it leaves the
/// process, then rebuilds the response unchanged.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        // The rebuilt body differs from the original in both failure paths,
        // so the stale length header has to go either way.
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        let bytes = match to_bytes(body, 1024).await {
            Ok(b) => b,
            Err(e) => {
                error!("failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        error!(
            "{} {} failed with {}: {}",
            method,
            uri,
            parts.status,
            String::from_utf8_lossy(&bytes)
        );

        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
