use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::credential::errors::CredentialError;
use crate::credential::gateway::bearer_token;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::subject::models::Subject;

/// Subject resolved by [`require_authentication`].
#[derive(Debug, Clone)]
pub struct AuthenticatedSubject(pub Subject);

/// Subject resolved by [`optional_authentication`], None for anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalSubject(pub Option<Subject>);

/// Middleware that rejects requests without a valid access token and adds the
/// subject to request extensions.
pub async fn require_authentication(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(&req)?.map(str::to_owned);
    let subject = state
        .credential_service
        .authenticate_required(token.as_deref())
        .await
        .map_err(|e| reject(e).into_response())?;

    req.extensions_mut().insert(AuthenticatedSubject(subject));
    Ok(next.run(req).await)
}

/// Middleware that admits only active superusers. Other authenticated
/// callers get 403.
pub async fn require_superuser(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(&req)?.map(str::to_owned);
    let subject = state
        .credential_service
        .authenticate_superuser(token.as_deref())
        .await
        .map_err(|e| reject(e).into_response())?;

    req.extensions_mut().insert(AuthenticatedSubject(subject));
    Ok(next.run(req).await)
}

/// Middleware that resolves the caller if possible and lets anonymous
/// requests through.
pub async fn optional_authentication(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(&req)?.map(str::to_owned);
    let subject = state
        .credential_service
        .authenticate_optional(token.as_deref())
        .await
        .map_err(|e| reject(e).into_response())?;

    req.extensions_mut().insert(OptionalSubject(subject));
    Ok(next.run(req).await)
}

fn extract_bearer(req: &Request) -> Result<Option<&str>, Response> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| {
            ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
        })?;

    bearer_token(header).map_err(|e| reject(e).into_response())
}

/// A token whose subject vanished is an authentication failure here, not a
/// missing resource.
fn reject(err: CredentialError) -> ApiError {
    match err {
        CredentialError::SubjectNotFound(_) => {
            ApiError::Unauthorized("Token subject not found".to_string())
        }
        other => {
            if other.is_client_error() {
                tracing::warn!(reason = %other, "Authentication rejected");
            }
            ApiError::from(other)
        }
    }
}
