//! JWT session tokens.
//!
//! Staff sign in against the hosted auth service, which hands the register an
//! HS256 access token. The register only validates it and turns the claims
//! into a [`Session`]. Issuing is kept for the dev tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use partsdesk_core::{Session, UserRole};

use crate::error::ApiError;

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff user id)
    pub sub: String,

    /// Display name
    pub name: String,

    /// `store_owner`, `warehouse_admin` or `shopkeeper`
    pub role: String,

    pub iat: i64,
    pub exp: i64,

    /// Token id
    pub jti: String,
}

impl TryFrom<Claims> for Session {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role: UserRole = claims
            .role
            .parse()
            .map_err(|_| ApiError::unauthenticated(format!("Unknown role: {}", claims.role)))?;
        Ok(Session::new(claims.sub, claims.name, role))
    }
}

pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        JwtManager {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    pub fn issue_token(&self, session: &Session) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: session.user_id.clone(),
            name: session.full_name.clone(),
            role: session.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {}", e)))
    }

    /// Checks signature and expiry and decodes the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    pub fn session_from_token(&self, token: &str) -> Result<Session, ApiError> {
        Session::try_from(self.validate_token(extract_bearer_token(token))?)
    }
}

/// Strips an optional `Bearer ` prefix.
pub fn extract_bearer_token(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix("Bearer ").unwrap_or(value)
}
