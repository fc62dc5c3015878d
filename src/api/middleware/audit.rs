//! Audit logging middleware.
//!
//! Logs every protected request with subject, method, path and response
//! status. Runs innermost (after auth has injected `AuthContext`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::session::AuthContext;

/// Log access for the audit trail.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let (subject, session_id) = req
        .extensions()
        .get::<AuthContext>()
        .map(|a| (a.subject.clone(), a.session_id.clone()))
        .unwrap_or_else(|| ("anonymous".to_string(), String::new()));

    let response = next.run(req).await;

    tracing::info!(
        target: "wardroom_lib::audit",
        %subject,
        %session_id,
        %method,
        %path,
        status = response.status().as_u16(),
        "access"
    );

    response
}
