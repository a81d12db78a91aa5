use auth::TokenPair;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::credential::errors::CredentialError;
use crate::inbound::http::router::AppState;
use crate::subject::models::EmailAddress;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<TokenPair>, ApiError> {
    // A malformed email cannot belong to anyone.
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::from(CredentialError::InvalidCredentials))?;

    state
        .credential_service
        .login(&email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|pair| ApiSuccess::new(StatusCode::OK, pair))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
