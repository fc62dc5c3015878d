//! Shared-password session gate.
//!
//! Two states: anonymous and authenticated. A correct login yields an
//! HS256-signed session token carried in a cookie; any instance holding
//! the same session secret accepts it, so no session table is kept.
//! Logout drops the cookie.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "ward_session";

/// Subject recorded for the shared front-desk login.
pub const STAFF_SUBJECT: &str = "staff";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Authenticated request context, injected by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub subject: String,
    pub session_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens and checks the login password.
pub struct SessionGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    login_password: String,
    ttl_secs: i64,
}

impl SessionGate {
    pub fn new(session_secret: &str, login_password: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(session_secret.as_bytes()),
            validation,
            login_password: login_password.to_string(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Constant-time comparison against the shared login password.
    pub fn check_password(&self, candidate: &str) -> bool {
        candidate
            .as_bytes()
            .ct_eq(self.login_password.as_bytes())
            .into()
    }

    /// Token for a correct password, `None` otherwise. A missing password
    /// is treated exactly like a wrong one.
    pub fn login(&self, password: Option<&str>) -> Result<Option<String>, SessionError> {
        match password {
            Some(candidate) if self.check_password(candidate) => {
                self.issue_at(Utc::now().timestamp()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Sign a session token issued at `now` (unix seconds).
    pub fn issue_at(&self, now: i64) -> Result<String, SessionError> {
        let claims = Claims {
            sub: STAFF_SUBJECT.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify a session token. Bad signatures, expired and malformed
    /// tokens all yield `None`.
    pub fn verify(&self, token: &str) -> Option<AuthContext> {
        let data = match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(%err, "Session token rejected");
                return None;
            }
        };
        let claims = data.claims;
        Some(AuthContext {
            subject: claims.sub,
            session_id: claims.jti,
            issued_at: Utc.timestamp_opt(claims.iat, 0).single()?,
            expires_at: Utc.timestamp_opt(claims.exp, 0).single()?,
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
