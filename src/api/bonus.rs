//! `/api/bonus` actions

use super::handlers::{authorize, respond};
use crate::error::{GameError, GameResult};
use crate::protocol::{ActionRequest, ApiResponse, BonusAction, BonusPayload, Payload};
use crate::state::AppState;
use crate::types::ImageView;

pub async fn handle_bonus(
    state: &AppState,
    session_id: Option<&str>,
    req: ActionRequest,
) -> ApiResponse {
    let action = req.action().to_string();
    let result = run(state, session_id, &req).await;
    respond("bonus", &action, session_id, result)
}

async fn run(
    state: &AppState,
    session_id: Option<&str>,
    req: &ActionRequest,
) -> GameResult<ApiResponse> {
    let mut session = authorize(state, session_id, req, false).await?;
    let action = BonusAction::parse(req)?;
    tracing::debug!("bonus {} for session {}", req.action(), session.id);

    match action {
        BonusAction::Start => {
            state.start_bonus(&mut session).await?;
            let game = session.bonus.as_ref().ok_or(GameError::MissingSessionData)?;
            Ok(ApiResponse::ok(Payload::Bonus(BonusPayload {
                images: Some(game.images.iter().map(ImageView::from).collect()),
                correct: None,
                correct_index: None,
                avatar: None,
            })))
        }

        BonusAction::Submit { selected_index } => {
            let outcome = state.submit_bonus(&mut session, &selected_index).await?;
            Ok(ApiResponse::ok(Payload::Bonus(BonusPayload {
                images: None,
                correct: Some(outcome.correct),
                correct_index: Some(outcome.correct_index),
                avatar: outcome.avatar,
            })))
        }
    }
}
