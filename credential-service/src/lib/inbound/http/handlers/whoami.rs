use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use super::SubjectData;
use crate::inbound::http::middleware::OptionalSubject;

pub async fn whoami(
    Extension(OptionalSubject(subject)): Extension<OptionalSubject>,
) -> ApiSuccess<WhoAmIResponseData> {
    let data = match subject {
        Some(ref subject) => WhoAmIResponseData::Subject(subject.into()),
        None => WhoAmIResponseData::Anonymous { anonymous: true },
    };

    ApiSuccess::new(StatusCode::OK, data)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WhoAmIResponseData {
    Subject(SubjectData),
    Anonymous { anonymous: bool },
}
