//! Patient admission form handler.

use axum::extract::State;
use axum::response::Redirect;
use axum::{Extension, Form};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::records::{self, NewPatient};
use crate::session::AuthContext;

/// `POST /add_patient`: insert the patient, back to the dashboard.
pub async fn add(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Form(form): Form<NewPatient>,
) -> Result<Redirect, ApiError> {
    let id = records::add_patient(ctx.store.as_ref(), form).await?;
    tracing::debug!(subject = %auth.subject, %id, "Patient form accepted");
    Ok(Redirect::to("/"))
}
