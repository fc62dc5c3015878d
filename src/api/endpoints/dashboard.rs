//! Dashboard endpoints: the HTML page and its JSON twin.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::{Extension, Json};
use chrono::{Local, NaiveDate};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::dashboard::{self, Dashboard};
use crate::session::AuthContext;
use crate::views::DashboardPage;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn load(ctx: &ApiContext, auth: &AuthContext, today: NaiveDate) -> Result<Dashboard, ApiError> {
    let data = dashboard::load_dashboard(ctx.store.as_ref(), today).await?;
    tracing::debug!(
        subject = %auth.subject,
        patients = data.patients.len(),
        doctors = data.doctors.len(),
        occupied = data.occupied_beds,
        "Dashboard assembled"
    );
    Ok(data)
}

/// `GET /`: rendered dashboard.
pub async fn page(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Html<String>, ApiError> {
    let today = today();
    let data = load(&ctx, &auth, today).await?;
    let page = DashboardPage::new(data, today);
    Ok(Html(page.render()?))
}

/// `GET /api/dashboard`: the same aggregate as JSON.
pub async fn json(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Dashboard>, ApiError> {
    Ok(Json(load(&ctx, &auth, today()).await?))
}
