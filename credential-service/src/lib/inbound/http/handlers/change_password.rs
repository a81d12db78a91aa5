use auth::TokenPair;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedSubject;
use crate::inbound::http::router::AppState;

/// Returns a fresh pair; every token issued before the change is revoked,
/// including the one that authorized this request.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(AuthenticatedSubject(subject)): Extension<AuthenticatedSubject>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<TokenPair>, ApiError> {
    state
        .credential_service
        .change_password(&subject, &body.old_password, &body.new_password)
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    old_password: String,
    new_password: String,
}
