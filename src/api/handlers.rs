//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use serde::Serialize;

use crate::auth::AuthError;
use crate::cooldown::{CheckRequest, CheckResponse};
use crate::evaluator::Evaluator;
use crate::github::PersonalAccessToken;
use crate::telemetry::TelemetryEvent;

use super::AppState;
use super::error::ApiError;

#[derive(Debug, Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `POST /check`.
///
/// The caller is authenticated before the body is looked at, so an
/// unauthenticated caller cannot learn anything from request validation.
pub(super) async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CheckResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(AuthError::MissingCredential)?;
    let gateway = state
        .gateways
        .for_token(&token)
        .map_err(|error| ApiError::Internal {
            message: format!("build GitHub client: {error}"),
        })?;
    let caller = state.credentials.validate(&token, gateway.as_ref()).await?;

    let request: CheckRequest =
        serde_json::from_slice(&body).map_err(|error| ApiError::InvalidBody {
            message: error.to_string(),
        })?;
    let params = request.validate()?;
    tracing::debug!(
        %caller,
        login = %params.login,
        repo = %params.repo,
        pr_number = params.pr_number,
        "check requested"
    );

    let evaluator = Evaluator::new(state.store.as_ref(), gateway.as_ref(), state.settings)
        .with_login_locks(&state.login_locks);
    let response = evaluator
        .check_with_timeout(&params, state.request_timeout)
        .await?;

    state.telemetry.record(TelemetryEvent::CheckCompleted {
        login: params.login,
        verdict: response.verdict,
        cooldown_level: response.cooldown_level,
    });
    Ok(Json(response))
}

fn bearer_token(headers: &HeaderMap) -> Option<PersonalAccessToken> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(PersonalAccessToken::from_authorization_header)
}
