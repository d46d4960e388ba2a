//! HTTP client for the Mekong Market backend.
//!
//! Single entry point wrapping the base URL, JSON (de)serialization, bearer
//! token attachment, and error normalization. Callers never see a raw
//! `reqwest::Error` - every failure becomes an [`ApiError`].
//!
//! A 401 from any call logs the session out before the error is surfaced, so
//! an expired token downgrades the whole client to anonymous in one place.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::error::GENERIC_ERROR_MESSAGE;
use crate::session::SessionStore;

/// Normalized API failure.
///
/// `Clone` is required because in-flight query results are shared between
/// concurrent callers.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body's `detail` field,
        /// or a generic fallback.
        message: String,
    },

    /// The request never got a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected schema.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when the backend answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    /// The message a view should surface to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Network(_) | Self::Decode(_) => GENERIC_ERROR_MESSAGE.to_owned(),
        }
    }

    /// Whether this is a non-2xx response with the given status.
    #[must_use]
    pub fn is_status(&self, code: StatusCode) -> bool {
        self.status_code() == Some(code.as_u16())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Client for the Mekong Market REST API.
///
/// Cheaply cloneable; all clones share one connection pool and session handle.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(base_url: Url, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url,
                session,
            }),
        }
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, Some(to_body(body)?)).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, Some(to_body(body)?)).await
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Execute a request against the backend.
    ///
    /// Attaches the bearer token when a session exists. A 401 response logs
    /// the session out as a side effect before the error is returned.
    #[instrument(skip(self, body), fields(path = %path))]
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid request path: {e}")))?;

        let mut request = self.inner.http.request(method, url);

        if let Some(token) = self.inner.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected the session token, logging out");
            self.inner.session.logout();
        }

        // Read the body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = %status, "non-success response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_detail(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse backend response"
            );
            ApiError::Decode(e.to_string())
        })
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pull the human-readable message out of an error body.
///
/// The backend reports errors as `{"detail": "..."}`; anything else falls
/// back to the generic message.
fn extract_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_owned))
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_from_backend_error() {
        assert_eq!(
            extract_detail(r#"{"detail": "Sản phẩm không tồn tại"}"#),
            "Sản phẩm không tồn tại"
        );
    }

    #[test]
    fn test_extract_detail_fallback() {
        assert_eq!(extract_detail("not json"), GENERIC_ERROR_MESSAGE);
        assert_eq!(extract_detail(r#"{"error": "other"}"#), GENERIC_ERROR_MESSAGE);
        assert_eq!(extract_detail(r#"{"detail": 5}"#), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_status_code() {
        let err = ApiError::Status {
            status: 404,
            message: "missing".into(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert!(err.is_status(StatusCode::NOT_FOUND));
        assert_eq!(ApiError::Network("down".into()).status_code(), None);
    }
}
