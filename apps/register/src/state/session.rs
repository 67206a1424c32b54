//! # Session State
//!
//! Who is signed in at this register.
//!
//! Commands never read this behind the caller's back. The caller fetches the
//! session with [`SessionState::require`] and passes it to each command.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use partsdesk_core::{CoreError, Session};

use crate::auth::JwtManager;
use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct SessionState {
    current: Mutex<Option<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Signs in with an access token from the auth service.
    pub fn sign_in(&self, jwt: &JwtManager, token: &str) -> Result<Session, ApiError> {
        let session = jwt.session_from_token(token)?;
        self.set(session.clone());
        Ok(session)
    }

    /// Signs in an already-verified session (offline login, tests).
    pub fn set(&self, session: Session) {
        info!(user_id = %session.user_id, role = %session.role.as_str(), "Signed in");
        *self.lock() = Some(session);
    }

    pub fn sign_out(&self) {
        if let Some(session) = self.lock().take() {
            info!(user_id = %session.user_id, "Signed out");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The signed-in session, or `Unauthenticated`.
    pub fn require(&self) -> Result<Session, ApiError> {
        self.current()
            .ok_or_else(|| ApiError::from(CoreError::Unauthenticated))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
