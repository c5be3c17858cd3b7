//! TV Time client boundary and its HTTP implementation.
//!
//! The delivery loop only depends on the [`TrackingClient`] trait, which makes
//! it testable against scripted in-memory clients. [`HttpTrackingClient`] is the
//! production implementation.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::error::{Operation, TrackingError, classify_status};
use crate::types::EpisodeId;

/// Default request timeout for tracking-service calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the delivery loop needs from the tracking service.
pub trait TrackingClient: Send + Sync {
    /// Re-establishes the session with the configured credentials.
    fn login(&self) -> impl Future<Output = Result<(), TrackingError>> + Send;

    /// Marks an episode as watched, returning the service's confirmation text.
    fn record_watched(
        &self,
        episode: &EpisodeId,
    ) -> impl Future<Output = Result<String, TrackingError>> + Send;
}

/// Credentials for the tracking service.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// A reqwest-backed TV Time client holding one session token.
///
/// - `POST {base}/api/login` with `{username, password}` → `{token}`
/// - `POST {base}/api/episodes/{id}/watched` with `Authorization: Bearer {token}`
pub struct HttpTrackingClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    session: RwLock<Option<String>>,
}

impl HttpTrackingClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self, TrackingError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TrackingError::from_reqwest)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            session: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true once a login has succeeded.
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn do_login(&self) -> Result<(), TrackingError> {
        let url = format!("{}/api/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&self.credentials)
            .send()
            .await
            .map_err(TrackingError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(Operation::Login, response).await);
        }

        let body: LoginResponse = response.json().await.map_err(TrackingError::from_reqwest)?;
        *self.session.write().await = Some(body.token);
        debug!(user = %self.credentials.username, "Logged in to TV Time");
        Ok(())
    }

    async fn do_record_watched(&self, episode: &EpisodeId) -> Result<String, TrackingError> {
        let token = self
            .session
            .read()
            .await
            .clone()
            .ok_or_else(|| TrackingError::transient("not logged in"))?;

        let url = format!("{}/api/episodes/{}/watched", self.base_url, episode);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(TrackingError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(error_from_response(Operation::RecordWatched, response).await);
        }

        response.text().await.map_err(TrackingError::from_reqwest)
    }
}

impl TrackingClient for HttpTrackingClient {
    fn login(&self) -> impl Future<Output = Result<(), TrackingError>> + Send {
        self.do_login()
    }

    fn record_watched(
        &self,
        episode: &EpisodeId,
    ) -> impl Future<Output = Result<String, TrackingError>> + Send {
        self.do_record_watched(episode)
    }
}

impl std::fmt::Debug for HttpTrackingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTrackingClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

async fn error_from_response(operation: Operation, response: reqwest::Response) -> TrackingError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("{:?} rejected", operation)
    } else {
        body
    };
    TrackingError::from_status(classify_status(operation, status), status, message)
}
