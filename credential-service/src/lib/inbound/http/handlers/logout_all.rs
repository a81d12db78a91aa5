use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::middleware::AuthenticatedSubject;
use crate::inbound::http::router::AppState;

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(AuthenticatedSubject(subject)): Extension<AuthenticatedSubject>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .credential_service
        .logout_everywhere(&subject)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out of all sessions")))
}
