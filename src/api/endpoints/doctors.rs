//! Doctor form handler.

use axum::extract::State;
use axum::response::Redirect;
use axum::{Extension, Form};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::records::{self, NewDoctor};
use crate::session::AuthContext;

/// `POST /add_doctor`: insert the doctor, back to the dashboard.
///
/// The body is taken as raw pairs because `days` repeats once per
/// checked weekday.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let form = NewDoctor::from_pairs(pairs);
    let id = records::add_doctor(ctx.store.as_ref(), form).await?;
    tracing::debug!(subject = %auth.subject, %id, "Doctor form accepted");
    Ok(Redirect::to("/"))
}
