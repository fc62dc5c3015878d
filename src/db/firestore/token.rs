//! OAuth2 access tokens for a service account (JWT bearer grant).
//!
//! A short-lived RS256 assertion signed with the key's private key is
//! exchanged at the key's `token_uri`. The resulting access token is cached
//! until shortly before it expires.

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::db::DatabaseError;

pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime; the token endpoint caps it at one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

/// Refresh this long before the cached token expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_TTL_SECS as u64
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct TokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    /// Fails when the key's private key is not a valid RSA PEM.
    pub fn new(key: ServiceAccountKey) -> Result<Self, DatabaseError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| DatabaseError::Token(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Claims for an assertion issued at `now` (unix seconds).
    pub fn assertion_claims(key: &ServiceAccountKey, now: i64) -> AssertionClaims {
        AssertionClaims {
            iss: key.client_email.clone(),
            scope: DATASTORE_SCOPE.to_string(),
            aud: key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        }
    }

    fn sign_assertion(&self) -> Result<String, DatabaseError> {
        let claims = Self::assertion_claims(&self.key, chrono::Utc::now().timestamp());
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| DatabaseError::Token(format!("signing assertion: {e}")))
    }

    /// A valid access token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, DatabaseError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.sign_assertion()?;
        let response = http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DatabaseError::Token(format!("{status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "Access token refreshed");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}
