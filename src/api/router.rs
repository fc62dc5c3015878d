//! Application router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack for protected routes (outermost → innermost):
//! 1. Cookie manager → 2. Cache-Control → 3. Session gate → 4. Audit logger

use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the application router.
///
/// Middleware uses `Extension<ApiContext>` (injected outside the session
/// gate). Handlers use `State<ApiContext>` (provided via `with_state`).
pub fn app_router(ctx: ApiContext) -> Router {
    let no_store = || {
        SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        )
    };

    // Pages: anonymous callers are redirected to the login form.
    let pages = Router::new()
        .route("/", get(endpoints::dashboard::page))
        .route("/add_patient", post(endpoints::patients::add))
        .route("/add_doctor", post(endpoints::doctors::add))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        .layer(no_store())
        .layer(axum::Extension(ctx.clone()));

    // JSON: anonymous callers get 401.
    let api = Router::new()
        .route("/api/dashboard", get(endpoints::dashboard::json))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_session_api))
        .layer(no_store())
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route(
            "/login",
            get(endpoints::auth::form).post(endpoints::auth::login),
        )
        .route("/logout", get(endpoints::auth::logout))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .merge(pages)
        .merge(api)
        .merge(public)
        .layer(CookieManagerLayer::new())
}
