//! HTTP API endpoints.
//!
//! The axum functions here only deal with cookies and the form body; the game
//! logic lives in the pure `handle_*` functions so tests can call them directly.
//! Every response is HTTP 200 with an `ApiResponse` JSON body.

pub mod bonus;
pub mod bots;
pub mod daily;
pub mod handlers;

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth;
use crate::error::GameError;
use crate::protocol::{ActionRequest, ApiResponse};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/daily", post(daily))
        .route("/api/bonus", post(bonus))
        .route("/api/bots", post(bots))
        .route("/health", get(health))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn invalid_body(rejection: FormRejection) -> Json<ApiResponse> {
    tracing::debug!("Rejected request body: {}", rejection);
    Json(ApiResponse::error(&GameError::invalid("Invalid request")))
}

/// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ActionRequest>, FormRejection>,
) -> Response {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };
    let previous = auth::session_id_from_headers(&headers);

    let (resp, session_id) = handlers::handle_login(&state, previous.as_deref(), req).await;
    match session_id {
        Some(id) => (
            [(header::SET_COOKIE, auth::session_cookie(&id))],
            Json(resp),
        )
            .into_response(),
        None => Json(resp).into_response(),
    }
}

/// POST /api/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ActionRequest>, FormRejection>,
) -> Response {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };
    let session_id = auth::session_id_from_headers(&headers);

    let resp = handlers::handle_logout(&state, session_id.as_deref(), req).await;
    if resp.success {
        (
            [(header::SET_COOKIE, auth::expired_session_cookie())],
            Json(resp),
        )
            .into_response()
    } else {
        Json(resp).into_response()
    }
}

/// POST /api/daily
async fn daily(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ActionRequest>, FormRejection>,
) -> Json<ApiResponse> {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => return invalid_body(rejection),
    };
    let session_id = auth::session_id_from_headers(&headers);
    Json(daily::handle_daily(&state, session_id.as_deref(), req).await)
}

/// POST /api/bonus
async fn bonus(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ActionRequest>, FormRejection>,
) -> Json<ApiResponse> {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => return invalid_body(rejection),
    };
    let session_id = auth::session_id_from_headers(&headers);
    Json(bonus::handle_bonus(&state, session_id.as_deref(), req).await)
}

/// POST /api/bots
async fn bots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ActionRequest>, FormRejection>,
) -> Json<ApiResponse> {
    let Form(req) = match form {
        Ok(form) => form,
        Err(rejection) => return invalid_body(rejection),
    };
    let session_id = auth::session_id_from_headers(&headers);
    Json(bots::handle_bots(&state, session_id.as_deref(), req).await)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.session_count().await,
    })
}
