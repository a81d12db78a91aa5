use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::forgot_password_request::forgot_password_request;
use super::handlers::forgot_password_reset::forgot_password_reset;
use super::handlers::login::login;
use super::handlers::logout_all::logout_all;
use super::handlers::profile::profile;
use super::handlers::refresh_token::refresh_token;
use super::handlers::registration::registration;
use super::handlers::subject_detail::subject_detail;
use super::handlers::whoami::whoami;
use super::middleware::optional_authentication;
use super::middleware::require_authentication;
use super::middleware::require_superuser;
use crate::credential::ports::CredentialServicePort;

#[derive(Clone)]
pub struct AppState {
    pub credential_service: Arc<dyn CredentialServicePort>,
}

pub fn create_router(credential_service: Arc<dyn CredentialServicePort>) -> Router {
    let state = AppState { credential_service };

    let public_routes = Router::new()
        .route("/api/v1/auth/registration", post(registration))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh-token", post(refresh_token))
        .route(
            "/api/v1/auth/forgot-password-request",
            post(forgot_password_request),
        )
        .route(
            "/api/v1/auth/forgot-password-reset",
            post(forgot_password_reset),
        );

    let protected_routes = Router::new()
        .route("/api/v1/auth/change-password", post(change_password))
        .route("/api/v1/auth/logout-all", post(logout_all))
        .route("/api/v1/user/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authentication,
        ));

    let admin_routes = Router::new()
        .route("/api/v1/admin/subjects/:id", get(subject_detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_superuser,
        ));

    let optional_routes = Router::new()
        .route("/api/v1/auth/whoami", get(whoami))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_authentication,
        ));

    // Headers are left out of the span; they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri().path(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri().path(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .merge(optional_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
