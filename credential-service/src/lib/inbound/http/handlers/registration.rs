use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SubjectData;
use crate::inbound::http::router::AppState;
use crate::subject::models::EmailAddress;

pub async fn registration(
    State(state): State<AppState>,
    Json(body): Json<RegistrationRequest>,
) -> Result<ApiSuccess<SubjectData>, ApiError> {
    let email = EmailAddress::new(body.email)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid email: {}", e)))?;

    state
        .credential_service
        .register(email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref subject| ApiSuccess::new(StatusCode::CREATED, subject.into()))
}

/// HTTP request body for registering a subject (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationRequest {
    email: String,
    password: String,
}
