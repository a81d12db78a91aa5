use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;

pub async fn forgot_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .credential_service
        .reset_password(&body.token, &body.new_password, body.force_logout)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Successfully reset password")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordResetRequest {
    token: String,
    new_password: String,
    /// Also revoke every outstanding token of the subject
    #[serde(default)]
    force_logout: bool,
}
