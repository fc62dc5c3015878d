//! Session cookie authentication middleware.
//!
//! Reads the `ward_session` cookie, verifies it with the `SessionGate`,
//! and injects the resulting `AuthContext` into request extensions for
//! downstream handlers. Page routes send anonymous callers to the login
//! form; JSON routes answer 401.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::Cookies;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::session::{AuthContext, SESSION_COOKIE};

/// Where anonymous page requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Verify the session cookie carried by `req`, if any.
fn authenticate<B>(req: &Request<B>) -> Result<AuthContext, ApiError> {
    let ctx = req
        .extensions()
        .get::<ApiContext>()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let cookies = req
        .extensions()
        .get::<Cookies>()
        .ok_or(ApiError::Internal("missing cookie manager".into()))?;

    let token = cookies
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized)?;

    ctx.sessions.verify(&token).ok_or(ApiError::Unauthorized)
}

/// Require a session for page routes; redirect to the login form otherwise.
pub async fn require_session(mut req: Request<axum::body::Body>, next: Next) -> Response {
    match authenticate(&req) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(ApiError::Unauthorized) => Redirect::to(LOGIN_PATH).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Require a session for JSON routes; 401 otherwise.
pub async fn require_session_api(mut req: Request<axum::body::Body>, next: Next) -> Response {
    match authenticate(&req) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
