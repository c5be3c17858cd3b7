//! Read-only show list endpoints.
//!
//! Both lists are fixed at startup; these handlers return sorted snapshots.

use axum::Json;
use axum::extract::State;

use super::AppState;
use crate::types::Show;

/// `GET /api/v1/shows/excluded`
///
/// ```ignore
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// [{"title":"Foo, Bar"},{"title":"Baz"}]
/// ```
pub async fn excluded_shows_handler(State(app_state): State<AppState>) -> Json<Vec<Show>> {
    Json(app_state.service().excluded_shows())
}

/// `GET /api/v1/shows/included`
pub async fn included_shows_handler(State(app_state): State<AppState>) -> Json<Vec<Show>> {
    Json(app_state.service().included_shows())
}
