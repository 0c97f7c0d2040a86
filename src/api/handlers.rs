//! Shared request plumbing: session lookup, CSRF, error mapping, login/logout

use tokio::sync::OwnedMutexGuard;

use crate::error::{GameError, GameResult};
use crate::protocol::{ActionRequest, ApiResponse, LoginPayload, Payload};
use crate::state::{AppState, UserSession};
use crate::types::SessionId;

/// Lock the caller's session and, unless the action is read-only, check the CSRF token.
/// Authentication is checked before the token.
pub async fn authorize(
    state: &AppState,
    session_id: Option<&str>,
    req: &ActionRequest,
    read_only: bool,
) -> GameResult<OwnedMutexGuard<UserSession>> {
    let session = state.get_session(session_id).await?;
    let mut session = session.lock_owned().await;
    session.touch();
    if !read_only {
        session.verify_csrf(req.csrf_token.as_deref())?;
    }
    Ok(session)
}

/// Turn a handler result into a response, logging failures server-side
pub fn respond(
    endpoint: &str,
    action: &str,
    session_id: Option<&str>,
    result: GameResult<ApiResponse>,
) -> ApiResponse {
    let session_id = session_id.unwrap_or("-");
    match result {
        Ok(resp) => resp,
        Err(e) => {
            match &e {
                GameError::Persistence(err) => tracing::error!(
                    "{} {} failed for session {}: {}",
                    endpoint,
                    action,
                    session_id,
                    err
                ),
                GameError::Unauthenticated | GameError::InvalidCsrfToken => tracing::warn!(
                    "{} {} rejected for session {}: {}",
                    endpoint,
                    action,
                    session_id,
                    e
                ),
                _ => tracing::debug!(
                    "{} {} rejected for session {}: {}",
                    endpoint,
                    action,
                    session_id,
                    e
                ),
            }
            ApiResponse::error(&e)
        }
    }
}

/// Log in as `req.username`. Returns the new session id for the cookie.
/// A session the caller already had is dropped.
pub async fn handle_login(
    state: &AppState,
    previous: Option<&str>,
    req: ActionRequest,
) -> (ApiResponse, Option<SessionId>) {
    let username = req.username.as_deref().unwrap_or("");
    match state.login(username).await {
        Ok(session) => {
            if let Some(previous) = previous {
                state.logout(previous).await;
            }
            let resp = ApiResponse::ok(Payload::Login(LoginPayload {
                username: session.username,
                csrf_token: session.csrf_token,
                is_admin: session.is_admin,
            }));
            (resp, Some(session.id))
        }
        Err(e) => (respond("login", "login", None, Err(e)), None),
    }
}

pub async fn handle_logout(
    state: &AppState,
    session_id: Option<&str>,
    req: ActionRequest,
) -> ApiResponse {
    let result = end_session(state, session_id, &req).await;
    respond("logout", "logout", session_id, result)
}

async fn end_session(
    state: &AppState,
    session_id: Option<&str>,
    req: &ActionRequest,
) -> GameResult<ApiResponse> {
    let id = authorize(state, session_id, req, false).await?.id.clone();
    state.logout(&id).await;
    Ok(ApiResponse::ok_message("Logged out"))
}
