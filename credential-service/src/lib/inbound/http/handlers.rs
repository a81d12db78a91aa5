use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::credential::errors::CredentialError;
use crate::subject::models::Subject;

pub mod change_password;
pub mod forgot_password_request;
pub mod forgot_password_reset;
pub mod login;
pub mod logout_all;
pub mod profile;
pub mod refresh_token;
pub mod registration;
pub mod subject_detail;
pub mod whoami;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                // Details stay in the logs.
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
            }
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken(_)
            | CredentialError::ExpiredToken
            | CredentialError::WrongKind { .. }
            | CredentialError::TokenRevoked
            | CredentialError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            CredentialError::SubjectInactive | CredentialError::PermissionDenied => {
                ApiError::Forbidden(err.to_string())
            }
            CredentialError::SubjectNotFound(_) => ApiError::NotFound(err.to_string()),
            CredentialError::ResetTokenNotFound
            | CredentialError::ResetTokenAlreadyUsed
            | CredentialError::ResetTokenExpired => ApiError::BadRequest(err.to_string()),
            CredentialError::WeakPassword(_)
            | CredentialError::InvalidEmail(_)
            | CredentialError::InvalidSubjectId(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            CredentialError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            CredentialError::Configuration(_)
            | CredentialError::Password(_)
            | CredentialError::DatabaseError(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of a subject. Never carries the hash or the rotation tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectData {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Subject> for SubjectData {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id.as_i64(),
            email: subject.email.as_str().to_string(),
            is_active: subject.is_active,
            is_superuser: subject.is_superuser,
            last_login: subject.last_login,
            created_at: subject.created_at,
        }
    }
}
