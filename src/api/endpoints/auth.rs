//! Login and logout.
//!
//! `GET /login`: login form
//! `POST /login`: correct password sets the session cookie and goes to `/`;
//! anything else re-renders the form
//! `GET /logout`: drops the session cookie, back to the form

use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::api::error::ApiError;
use crate::api::middleware::auth::LOGIN_PATH;
use crate::api::types::ApiContext;
use crate::session::SESSION_COOKIE;
use crate::views::LoginPage;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: Option<String>,
}

fn login_page() -> Result<Response, ApiError> {
    Ok(Html(LoginPage::new().render()?).into_response())
}

/// `GET /login`
pub async fn form() -> Result<Response, ApiError> {
    login_page()
}

/// `POST /login`
pub async fn login(
    State(ctx): State<ApiContext>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let Some(token) = ctx.sessions.login(form.password.as_deref())? else {
        tracing::info!("Login rejected");
        return login_page();
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ctx.sessions.ttl_secs()))
        .build();
    cookies.add(cookie);

    tracing::info!("Login accepted");
    Ok(Redirect::to("/").into_response())
}

/// `GET /logout`
pub async fn logout(cookies: Cookies) -> Redirect {
    cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Redirect::to(LOGIN_PATH)
}
