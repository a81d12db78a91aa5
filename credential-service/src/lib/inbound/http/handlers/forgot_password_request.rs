use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::router::AppState;
use crate::subject::models::EmailAddress;

const ACCEPTED_MESSAGE: &str = "If the address is registered, a reset link has been sent";

/// Always answers 202 so the endpoint cannot be used to enumerate accounts.
pub async fn forgot_password_request(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiSuccess<MessageData> {
    match EmailAddress::new(body.email) {
        Ok(email) => {
            if let Err(e) = state.credential_service.request_password_reset(&email).await {
                if e.is_client_error() {
                    tracing::debug!(reason = %e, "Password reset not issued");
                } else {
                    tracing::error!(error = %e, "Password reset request failed");
                }
            }
        }
        Err(e) => tracing::debug!(reason = %e, "Password reset for malformed email"),
    }

    ApiSuccess::new(StatusCode::ACCEPTED, MessageData::new(ACCEPTED_MESSAGE))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordRequest {
    email: String,
}
