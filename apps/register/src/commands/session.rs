//! # Session Commands
//!
//! Sign-in, sign-out and the role-filtered navigation.

use serde::Serialize;
use tracing::debug;

use partsdesk_core::access::NavItem;
use partsdesk_core::Session;

use crate::auth::JwtManager;
use crate::error::ApiError;
use crate::state::{ConfigState, SessionState};

/// Access token lifetime when the register issues its own tokens.
pub const LOCAL_TOKEN_LIFETIME_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: Session,
    pub navigation: Vec<NavItem>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        SessionResponse {
            navigation: session.nav_items(),
            session,
        }
    }
}

/// Signs in with the auth service's access token.
///
/// Fails with `INTERNAL` when no JWT secret is configured and
/// `UNAUTHENTICATED` for a bad or expired token.
pub fn sign_in(
    sessions: &SessionState,
    config: &ConfigState,
    token: &str,
) -> Result<SessionResponse, ApiError> {
    debug!("sign_in command");
    let secret = config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| ApiError::internal("PARTSDESK_JWT_SECRET is not configured"))?;

    let jwt = JwtManager::new(secret, LOCAL_TOKEN_LIFETIME_SECS);
    Ok(SessionResponse::from(sessions.sign_in(&jwt, token)?))
}

pub fn sign_out(sessions: &SessionState) {
    debug!("sign_out command");
    sessions.sign_out();
}

/// The current session and what it may open.
pub fn get_session(sessions: &SessionState) -> Result<SessionResponse, ApiError> {
    Ok(SessionResponse::from(sessions.require()?))
}
