//! `/api/daily` actions

use super::handlers::{authorize, respond};
use crate::error::{GameError, GameResult};
use crate::protocol::{
    ActionRequest, ApiResponse, DailyAction, DailyPayload, DailyResultPayload, FinalRoundView,
    Payload,
};
use crate::state::daily::{AnswerOutcome, DailyStatus};
use crate::state::AppState;
use crate::types::*;

pub async fn handle_daily(
    state: &AppState,
    session_id: Option<&str>,
    req: ActionRequest,
) -> ApiResponse {
    let action = req.action().to_string();
    let result = run(state, session_id, &req).await;
    respond("daily", &action, session_id, result)
}

async fn run(
    state: &AppState,
    session_id: Option<&str>,
    req: &ActionRequest,
) -> GameResult<ApiResponse> {
    let read_only = DailyAction::is_read_only(req.action());
    let mut session = authorize(state, session_id, req, read_only).await?;
    let action = DailyAction::parse(req)?;
    tracing::debug!("daily {} for session {}", req.action(), session.id);

    match action {
        DailyAction::Start => {
            state.start_daily(&mut session, &AppState::today()).await?;
            let status = session
                .daily
                .as_ref()
                .ok_or(GameError::MissingSessionData)?
                .status();
            daily_response(state, status, None).await
        }

        DailyAction::Answer { image_id, answer } => {
            let outcome = state
                .submit_daily_answer(&mut session, &image_id, &answer)
                .await?;
            answer_response(state, outcome).await
        }

        DailyAction::FinalAnswer { answer } => {
            let outcome = state.submit_final_answer(&mut session, &answer).await?;
            answer_response(state, outcome).await
        }

        DailyAction::State => match session.daily.as_ref() {
            Some(game) => daily_response(state, game.status(), None).await,
            None => {
                let record = state
                    .store
                    .daily_record(&session.username, &AppState::today())
                    .await?
                    .ok_or(GameError::MissingSessionData)?;
                Ok(ApiResponse::ok(Payload::DailyResult(
                    DailyResultPayload::from(record),
                )))
            }
        },

        DailyAction::Abandon => {
            state.abandon_daily(&mut session).await?;
            Ok(ApiResponse::ok_message("Daily challenge abandoned"))
        }
    }
}

async fn answer_response(state: &AppState, outcome: AnswerOutcome) -> GameResult<ApiResponse> {
    let answered = Some((outcome.correct, outcome.points));
    daily_response(state, outcome.status, answered).await
}

/// Build the client view of a daily game. The final round only exposes the
/// two images, never which side is real.
async fn daily_response(
    state: &AppState,
    status: DailyStatus,
    answered: Option<(bool, u32)>,
) -> GameResult<ApiResponse> {
    let final_round = match status.final_round {
        Some(ref fr) => Some(FinalRoundView {
            left: image_view(state, fr.left_image_id()).await?,
            right: image_view(state, fr.right_image_id()).await?,
        }),
        None => None,
    };

    let game_over = status.phase.is_terminal();
    Ok(ApiResponse::ok(Payload::Daily(DailyPayload {
        correct: answered.map(|(correct, _)| correct),
        points: answered.map(|(_, points)| points),
        score: status.score,
        lives: status.lives,
        streak: status.streak,
        round: status.round,
        total_rounds: status.total_rounds,
        game_over,
        completed: game_over.then(|| status.phase == DailyPhase::Completed),
        phase: status.phase,
        next_image: status.next_image.as_ref().map(ImageView::from),
        final_round,
    })))
}

async fn image_view(state: &AppState, id: &str) -> GameResult<ImageView> {
    state
        .store
        .get_image(id)
        .await?
        .as_ref()
        .map(ImageView::from)
        .ok_or_else(|| GameError::NotFound("Image".to_string()))
}
