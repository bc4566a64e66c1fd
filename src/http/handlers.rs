//! Route handlers.
//!
//! Requests arriving here have already passed the gatekeeper; the form
//! handler still runs its own throttle, CSRF check, validation and
//! sanitization.

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;

use crate::error::SecurityError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::gatekeeper::SessionContext;
use crate::security::{patterns, sanitize};

const ACCEPTED_YEARS: &[&str] = &["freshman", "sophomore", "junior", "senior", "graduate"];

#[derive(Deserialize, Default)]
pub struct JoinForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub year: String,
}

#[derive(Serialize)]
pub struct SubmissionAck {
    pub success: bool,
    pub message: String,
}

/// `GET /`: serve the page with a fresh CSRF token bound in.
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Response, SecurityError> {
    let token = state.gatekeeper.csrf.issue(&session.id);
    let page = state.assets.index_with_token(&token).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        page,
    )
        .into_response())
}

/// `GET /styles.css`
pub async fn styles(State(state): State<AppState>) -> Result<Response, SecurityError> {
    let content = state.assets.read("styles.css").await?;
    Ok((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        content,
    )
        .into_response())
}

/// `GET /script.js`
pub async fn script(State(state): State<AppState>) -> Result<Response, SecurityError> {
    let content = state.assets.read("script.js").await?;
    Ok((
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        content,
    )
        .into_response())
}

/// `POST /submit-form`
///
/// Check order is fixed: endpoint throttle, then CSRF, then field
/// validation. A CSRF failure never looks at the other fields.
pub async fn submit_form(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(session): Extension<SessionContext>,
    form: Result<Form<JoinForm>, FormRejection>,
) -> Result<Json<SubmissionAck>, SecurityError> {
    // A body that does not parse as a form carries no usable token; treat it
    // as an empty submission so it fails the CSRF check with the same JSON
    // response every other rejection gets, not the framework's plain-text 415.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(client = %addr.ip(), %rejection, "unparseable form body");
            JoinForm::default()
        }
    };

    if !state.form_limiter.allow(addr.ip()) {
        tracing::warn!(client = %addr.ip(), "form endpoint rate limit exceeded");
        metrics::record_rate_limited("form");
        return Err(SecurityError::RateLimited);
    }

    if !state.gatekeeper.csrf.validate(&session.id, &form.csrf_token) {
        tracing::warn!(client = %addr.ip(), "csrf token validation failed");
        return Err(SecurityError::CsrfMismatch);
    }

    let name = form.name.trim();
    let email = form.email.trim();
    let year = form.year.trim();

    if !patterns::is_valid_name(name) {
        return Err(SecurityError::MalformedInput("Invalid name format"));
    }
    if !patterns::is_valid_email(email) {
        return Err(SecurityError::MalformedInput("Invalid email format"));
    }
    if !ACCEPTED_YEARS.contains(&year) {
        return Err(SecurityError::MalformedInput("Invalid year selection"));
    }

    let name = sanitize::sanitize(name);
    let email = sanitize::sanitize(email);

    metrics::record_form_submission();
    state.gatekeeper.audit.log(
        "FORM_SUBMISSION",
        &format!("name={} email={} year={}", name, email, year),
    );
    tracing::info!(%name, %email, %year, "form submitted");

    // No persistence; acknowledgment is the whole outcome
    Ok(Json(SubmissionAck {
        success: true,
        message: format!("Thank you for joining, {name}! We'll be in touch at {email} soon."),
    }))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// JSON 404 for everything unrouted.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Resource not found" })),
    )
        .into_response()
}
