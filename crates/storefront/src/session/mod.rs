//! Auth session store.
//!
//! Process-wide session state with two possible shapes: **anonymous**
//! (`None`) and **authenticated** (`Some(Session)`). Transitions happen on
//! [`SessionStore::login`], [`SessionStore::logout`], and as a side effect of
//! any API call answered with 401. State lives behind a `tokio::sync::watch`
//! channel so dependent views can subscribe to transitions instead of polling.
//!
//! The access token is persisted in a single [`slot::SessionSlot`] so a
//! session survives restarts; an expired token found at startup is discarded.

mod claims;
mod slot;

pub use claims::{ClaimsError, TokenClaims, decode_unverified};
pub use slot::{FileSlot, MemorySlot, SessionSlot};

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use mekong_core::{Email, UserId};

/// Errors that can occur when establishing a session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The token could not be decoded.
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] ClaimsError),
    /// The token carried an email the client refuses to display.
    #[error("invalid identity claims: {0}")]
    InvalidClaims(String),
    /// The token was already expired.
    #[error("session token expired")]
    Expired,
}

/// The identity of the logged-in user, decoded from token claims.
///
/// Trusted for display purposes only; authorization decisions remain
/// server-enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address (the token subject).
    pub email: Email,
    /// Display username.
    pub username: String,
    /// Whether the admin navigation should be shown.
    pub is_admin: bool,
}

/// An established session: who, plus the bearer token proving it.
#[derive(Debug, Clone)]
pub struct Session {
    user: CurrentUser,
    token: String,
}

impl Session {
    /// The logged-in user.
    #[must_use]
    pub const fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// The bearer token for API calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Process-wide auth session store.
///
/// Cheaply cloneable; all clones observe and drive the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    slot: Box<dyn SessionSlot>,
    state: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create a session store backed by the given slot.
    ///
    /// A token already in the slot is restored when it still parses and has
    /// not expired; otherwise the slot is cleared and the store starts
    /// anonymous. Persistence failures are logged, never fatal - a session
    /// that does not survive a restart beats a storefront that cannot start.
    #[must_use]
    pub fn new(slot: impl SessionSlot + 'static) -> Self {
        let slot: Box<dyn SessionSlot> = Box::new(slot);
        let initial = restore(slot.as_ref());
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(SessionStoreInner { slot, state }),
        }
    }

    /// Create a store with no persistence, for tests and ephemeral shells.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemorySlot::default())
    }

    /// Transition to authenticated with a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not decode, is expired, or carries
    /// an unusable email claim. On error the store stays in its previous
    /// state.
    pub fn login(&self, token: &str) -> Result<CurrentUser, SessionError> {
        let session = session_from_token(token)?;
        let user = session.user.clone();

        if let Err(e) = self.inner.slot.store(token) {
            warn!(error = %e, "failed to persist session token");
        }
        self.inner.state.send_replace(Some(session));
        info!(user = %user.username, "session established");

        Ok(user)
    }

    /// Transition to anonymous. Idempotent.
    pub fn logout(&self) {
        if let Err(e) = self.inner.slot.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        let was_authenticated = self.inner.state.send_replace(None).is_some();
        if was_authenticated {
            info!("session ended");
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.inner.state.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Whether a session is established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// The bearer token for API calls, if a session is established.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().as_ref().map(|s| s.token.clone())
    }

    /// Subscribe to session transitions.
    ///
    /// The receiver observes the current state immediately and every
    /// login/logout after that.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.state.subscribe()
    }
}

/// Build a session from a raw token, validating claims and expiry.
fn session_from_token(token: &str) -> Result<Session, SessionError> {
    let claims = decode_unverified(token)?;

    if claims.is_expired_at(Utc::now().timestamp()) {
        return Err(SessionError::Expired);
    }

    let email = Email::parse(&claims.sub).map_err(|e| SessionError::InvalidClaims(e.to_string()))?;

    Ok(Session {
        user: CurrentUser {
            id: UserId::new(claims.id),
            email,
            username: claims.username,
            is_admin: claims.is_admin,
        },
        token: token.to_owned(),
    })
}

/// Restore a persisted session at startup, discarding anything unusable.
fn restore(slot: &dyn SessionSlot) -> Option<Session> {
    let token = match slot.load() {
        Ok(token) => token?,
        Err(e) => {
            warn!(error = %e, "failed to read persisted session");
            return None;
        }
    };

    match session_from_token(&token) {
        Ok(session) => {
            debug!(user = %session.user.username, "restored persisted session");
            Some(session)
        }
        Err(e) => {
            debug!(error = %e, "discarding persisted session");
            if let Err(e) = slot.clear() {
                warn!(error = %e, "failed to clear persisted session");
            }
            None
        }
    }
}
