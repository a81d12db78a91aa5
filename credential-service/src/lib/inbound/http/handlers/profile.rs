use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::SubjectData;
use crate::inbound::http::middleware::AuthenticatedSubject;

pub async fn profile(
    Extension(AuthenticatedSubject(subject)): Extension<AuthenticatedSubject>,
) -> ApiSuccess<SubjectData> {
    ApiSuccess::new(StatusCode::OK, (&subject).into())
}
