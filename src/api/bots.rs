//! `/api/bots` actions

use super::handlers::{authorize, respond};
use crate::bots::generate_bot_names;
use crate::error::GameResult;
use crate::protocol::{ActionRequest, ApiResponse, BotsAction, BotsPayload, Payload};
use crate::state::AppState;

pub async fn handle_bots(
    state: &AppState,
    session_id: Option<&str>,
    req: ActionRequest,
) -> ApiResponse {
    let action = req.action().to_string();
    let result = run(state, session_id, &req).await;
    respond("bots", &action, session_id, result)
}

async fn run(
    state: &AppState,
    session_id: Option<&str>,
    req: &ActionRequest,
) -> GameResult<ApiResponse> {
    let session = authorize(state, session_id, req, false).await?;
    let BotsAction::Generate { count } = BotsAction::parse(req)?;
    tracing::debug!("bots generate {} for session {}", count, session.id);
    drop(session);

    let bot_names = generate_bot_names(state.bot_names.as_ref(), count).await;
    Ok(ApiResponse::ok(Payload::Bots(BotsPayload { bot_names })))
}
