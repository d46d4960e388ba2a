//! Unified error handling for the storefront data layer.
//!
//! All store operations return `Result<T, AppError>`. The taxonomy mirrors how
//! the UI reacts to each failure:
//!
//! - [`AppError::Validation`] - local form input rejected, no network call made;
//!   rendered inline at the field
//! - [`AppError::Api`] - the backend said no (or the network did); rendered as
//!   a transient notification
//! - [`AppError::NotFound`] - a fetched entity does not exist; rendered as an
//!   empty view state, not an error banner
//! - [`AppError::AuthRequired`] - action needs a session while anonymous;
//!   the view redirects to login

use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;

/// Fallback message when the backend provides no detail.
pub const GENERIC_ERROR_MESSAGE: &str = "Có lỗi xảy ra";

/// Application-level error type for the storefront data layer.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Local input validation failed. Never reaches the network.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The API call failed (non-2xx status or transport failure).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A fetched entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The action requires a logged-in session.
    #[error("login required")]
    AuthRequired,

    /// The session token could not be decoded or has expired.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl AppError {
    /// The message a view should surface to the user.
    ///
    /// Server-provided detail for API errors, the field message for validation
    /// errors, and a generic fallback for everything internal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Api(err) => err.user_message(),
            Self::NotFound(what) => format!("Không tìm thấy {what}"),
            Self::AuthRequired => "Vui lòng đăng nhập".to_owned(),
            Self::Session(_) => GENERIC_ERROR_MESSAGE.to_owned(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
