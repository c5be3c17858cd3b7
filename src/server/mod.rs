//! HTTP server for the scrobble relay.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from Plex and queues them for the worker
//! - Exposes the configured show lists read-only
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts Plex webhook deliveries (returns 202 Accepted)
//! - `GET /api/v1/shows/excluded` - Excluded shows as JSON
//! - `GET /api/v1/shows/included` - Included shows as JSON
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::service::ScrobbleService;

pub mod health;
pub mod shows;
pub mod webhook;

pub use health::health_handler;
pub use shows::{excluded_shows_handler, included_shows_handler};
pub use webhook::{WebhookError, webhook_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service: ScrobbleService,
}

impl AppState {
    pub fn new(service: ScrobbleService) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { service }),
        }
    }

    pub fn service(&self) -> &ScrobbleService {
        &self.inner.service
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/api/v1/shows/excluded", get(excluded_shows_handler))
        .route("/api/v1/shows/included", get(included_shows_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

/// Serves the router until `shutdown` fires, then drains open connections.
pub async fn serve(
    listener: TcpListener,
    app_state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening for Plex webhooks");
    }

    axum::serve(listener, build_router(app_state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::filter::FilterConfig;
    use crate::worker::{EventReceiver, event_queue};

    const BOUNDARY: &str = "plex-boundary-7MA4YWxkTrZu0gW";

    fn scrobble_json() -> serde_json::Value {
        serde_json::json!({
            "event": "media.scrobble",
            "Account": { "title": "alice" },
            "Metadata": {
                "librarySectionType": "show",
                "grandparentTitle": "Foo",
                "parentIndex": 1,
                "index": 2,
                "title": "Pilot",
                "Guid": [
                    { "id": "imdb://tt123" },
                    { "id": "tvdb://456" }
                ]
            }
        })
    }

    /// Creates app state whose queue is observable by the test.
    fn test_app_state(exclude: &str, include: &str) -> (AppState, EventReceiver) {
        let (sender, receiver) = event_queue();
        let filter = Arc::new(FilterConfig::initialize("alice", exclude, include));
        let state = AppState::new(ScrobbleService::from_parts(filter, sender));
        (state, receiver)
    }

    fn multipart_request(fields: &[(&str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, data) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    // ─── Health endpoint tests ───

    #[tokio::test]
    async fn health_returns_200() {
        let (state, _rx) = test_app_state("", "");
        let app = build_router(state);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    // ─── Webhook endpoint tests ───

    #[tokio::test]
    async fn multipart_webhook_is_queued() {
        let (state, mut rx) = test_app_state("", "");
        let app = build_router(state);

        let payload = serde_json::to_vec(&scrobble_json()).unwrap();
        let request = multipart_request(&[
            ("thumb", b"\x89PNG not really".as_slice()),
            ("payload", payload.as_slice()),
        ]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let event = rx.next().await.unwrap();
        assert_eq!(event.account, "alice");
        assert_eq!(event.show_title, "Foo");
        assert_eq!(event.cross_references.len(), 2);
    }

    #[tokio::test]
    async fn raw_json_webhook_is_queued() {
        let (state, mut rx) = test_app_state("", "");
        let app = build_router(state);

        let request = json_request(serde_json::to_vec(&scrobble_json()).unwrap());
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.next().await.unwrap().action, "media.scrobble");
    }

    #[tokio::test]
    async fn ineligible_event_is_still_accepted() {
        // Filtering happens on the worker, not in the handler.
        let (state, mut rx) = test_app_state("", "");
        let app = build_router(state);

        let mut body = scrobble_json();
        body["event"] = "media.play".into();
        body["Account"]["title"] = "mallory".into();

        let response = app
            .oneshot(json_request(serde_json::to_vec(&body).unwrap()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.next().await.unwrap().account, "mallory");
    }

    #[tokio::test]
    async fn multipart_without_payload_returns_400() {
        let (state, rx) = test_app_state("", "");
        let app = build_router(state);

        let request = multipart_request(&[("thumb", b"image".as_slice())]);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_returns_400() {
        let (state, rx) = test_app_state("", "");
        let app = build_router(state);

        let response = app
            .oneshot(json_request(b"{not json".to_vec()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn stopped_worker_returns_503() {
        let (state, rx) = test_app_state("", "");
        drop(rx);
        let app = build_router(state);

        let response = app
            .oneshot(json_request(serde_json::to_vec(&scrobble_json()).unwrap()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    // ─── Show list endpoint tests ───

    #[tokio::test]
    async fn excluded_shows_are_sorted_and_unescaped() {
        let (state, _rx) = test_app_state("Foo%2C Bar, Baz", "");
        let app = build_router(state);

        let request = Request::builder()
            .uri("/api/v1/shows/excluded")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{ "title": "Baz" }, { "title": "Foo, Bar" }])
        );
    }

    #[tokio::test]
    async fn included_shows_empty_by_default() {
        let (state, _rx) = test_app_state("", "");
        let app = build_router(state);

        let request = Request::builder()
            .uri("/api/v1/shows/included")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (state, _rx) = test_app_state("", "");
        let app = build_router(state);

        let request = Request::builder()
            .uri("/api/v1/shows/other")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
