//! Webhook endpoint handler.
//!
//! Accepts Plex webhook deliveries, parses them and queues the event before
//! returning 202 Accepted. Delivery to TV Time happens later on the worker.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::webhooks::{ParseError, parse_webhook};
use crate::worker::EnqueueError;

/// Name of the multipart field carrying the JSON document.
const PAYLOAD_FIELD: &str = "payload";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The multipart body could not be read.
    #[error("invalid multipart body: {0}")]
    InvalidMultipart(String),

    /// The multipart body had no `payload` field.
    #[error("missing 'payload' field")]
    MissingPayload,

    /// The request body could not be read.
    #[error("unreadable request body: {0}")]
    InvalidBody(String),

    /// The JSON document was malformed.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// The worker is no longer taking events.
    #[error("{0}")]
    Unavailable(#[from] EnqueueError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::InvalidMultipart(_)
            | WebhookError::MissingPayload
            | WebhookError::InvalidBody(_)
            | WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Body: `multipart/form-data` with the JSON document in the `payload`
///   field (what Plex sends), or the JSON document itself
///
/// # Response
///
/// - 202 Accepted: event queued
/// - 400 Bad Request: unreadable body, missing `payload`, or invalid JSON
/// - 503 Service Unavailable: the worker has stopped
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let payload = if is_multipart(request.headers()) {
        read_multipart_payload(request).await?
    } else {
        Bytes::from_request(request, &())
            .await
            .map_err(|e| WebhookError::InvalidBody(e.to_string()))?
    };

    let event = parse_webhook(&payload).inspect_err(|e| {
        warn!(error = %e, "Rejecting malformed webhook");
    })?;

    debug!(
        account = %event.account,
        action = %event.action,
        event = %event.describe(),
        "Received webhook"
    );

    app_state.service().mark_as_watched(event)?;

    Ok((StatusCode::ACCEPTED, "Accepted"))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Returns the `payload` field, skipping the thumbnail Plex may attach.
async fn read_multipart_payload(request: Request) -> Result<Bytes, WebhookError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| WebhookError::InvalidMultipart(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebhookError::InvalidMultipart(e.to_string()))?
    {
        if field.name() == Some(PAYLOAD_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| WebhookError::InvalidMultipart(e.to_string()));
        }
    }

    Err(WebhookError::MissingPayload)
}
