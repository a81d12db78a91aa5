use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::SubjectData;
use crate::inbound::http::router::AppState;
use crate::subject::models::SubjectId;

/// Superuser lookup of any subject.
pub async fn subject_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<SubjectData>, ApiError> {
    state
        .credential_service
        .find_subject(SubjectId(id))
        .await
        .map_err(ApiError::from)
        .map(|ref subject| ApiSuccess::new(StatusCode::OK, subject.into()))
}
