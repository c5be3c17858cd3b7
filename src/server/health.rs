//! Liveness endpoint.

use axum::http::StatusCode;

/// Returns 200 with the text "OK" while the server accepts connections.
///
/// The worker's state is not consulted: a worker that stopped on bad
/// credentials takes the whole process down with it.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
