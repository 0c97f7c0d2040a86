//! Daily challenge and bonus game operations on a user's session

use super::bonus::{select_bonus_images, BonusOutcome};
use super::daily::{select_daily_images, AnswerOutcome, DailyGame};
use super::evaluator::{evaluate_final, evaluate_regular, AnswerToken};
use super::{AppState, UserSession};
use crate::error::{GameError, GameResult};
use crate::types::*;

impl AppState {
    /// Start today's challenge for the session's user.
    ///
    /// A game already running today is kept, and one left unfinished in an
    /// earlier session is resumed from its stored progress. Admins always get
    /// a fresh game.
    pub async fn start_daily(&self, session: &mut UserSession, date: &str) -> GameResult<()> {
        if !session.is_admin {
            if let Some(game) = session.daily.as_ref().filter(|g| g.date == date) {
                if game.game_over() {
                    return Err(GameError::invalid("You have already played today's challenge"));
                }
                tracing::debug!("{} already has today's challenge running", session.username);
                return Ok(());
            }
        }

        if let Some(record) = self.store.daily_record(&session.username, date).await? {
            if !session.is_admin {
                return Err(GameError::invalid(if record.completed {
                    "You have already completed today's challenge"
                } else {
                    "You have already played today's challenge"
                }));
            }
            tracing::info!("Admin {} replaying daily challenge", session.username);
        }

        let progress = if session.is_admin {
            None
        } else {
            self.store.progress(&session.username, date).await?
        };
        if progress.as_ref().is_some_and(|p| p.game_over) {
            return Err(GameError::invalid("You have already played today's challenge"));
        }

        let rounds = self.game_config.daily_rounds as usize;
        let all_images = self.store.list_images().await?;
        let (images, final_round) = select_daily_images(&all_images, date, rounds)
            .ok_or_else(|| GameError::NotFound("Enough images for today's challenge".to_string()))?;

        if final_round.is_none() {
            tracing::warn!("No final round pair available for {}", date);
        }

        if let Some(progress) = progress {
            let game = DailyGame::resume(images, final_round, &progress);
            tracing::info!(
                "Daily challenge {} resumed for {} at round {}",
                date,
                session.username,
                game.round
            );
            session.daily = Some(game);
            return Ok(());
        }

        let game = DailyGame::new(
            date.to_string(),
            images,
            final_round,
            self.game_config.starting_lives,
        );
        let snapshot = game.snapshot(&session.username);
        session.daily = Some(game);

        self.store.save_progress(&snapshot).await?;
        tracing::info!("Daily challenge {} started for {}", date, session.username);
        Ok(())
    }

    /// Answer the current regular round
    pub async fn submit_daily_answer(
        &self,
        session: &mut UserSession,
        image_id: &str,
        answer: &str,
    ) -> GameResult<AnswerOutcome> {
        let token = AnswerToken::parse(answer)?;
        let game = session
            .daily
            .as_mut()
            .ok_or(GameError::MissingSessionData)?;
        game.expect_regular_answer(image_id)?;

        let image = self
            .store
            .get_image(image_id)
            .await?
            .ok_or_else(|| GameError::NotFound("Image".to_string()))?;
        let correct = evaluate_regular(token, &image)?;

        let outcome = game.record_regular_answer(correct);
        tracing::debug!(
            "{} answered round {} ({}): correct={}",
            session.username,
            game.round - 1,
            image_id,
            correct
        );

        self.persist_daily(session, &[image.id]).await?;
        Ok(outcome)
    }

    /// Answer the side-by-side final round
    pub async fn submit_final_answer(
        &self,
        session: &mut UserSession,
        answer: &str,
    ) -> GameResult<AnswerOutcome> {
        let token = AnswerToken::parse(answer)?;
        let game = session
            .daily
            .as_mut()
            .ok_or(GameError::MissingSessionData)?;
        let final_round = game.expect_final_answer()?;
        let correct = evaluate_final(token, final_round)?;
        let seen = vec![
            final_round.real_image_id.clone(),
            final_round.ai_image_id.clone(),
        ];

        let outcome = game.record_final_answer(correct);
        tracing::debug!("{} answered final round: correct={}", session.username, correct);

        self.persist_daily(session, &seen).await?;
        Ok(outcome)
    }

    /// Give up on the current daily game and clear it from the session
    pub async fn abandon_daily(&self, session: &mut UserSession) -> GameResult<()> {
        let game = session
            .daily
            .as_mut()
            .ok_or(GameError::MissingSessionData)?;
        game.abandon();
        self.persist_daily(session, &[]).await?;
        tracing::info!("{} abandoned the daily challenge", session.username);
        Ok(())
    }

    /// Write the progress snapshot, seen images and, for finished games, the
    /// result record. A finished game leaves the session once everything is stored.
    async fn persist_daily(
        &self,
        session: &mut UserSession,
        newly_seen: &[ImageId],
    ) -> GameResult<()> {
        let Some(game) = session.daily.as_ref() else {
            return Ok(());
        };

        self.store
            .save_progress(&game.snapshot(&session.username))
            .await?;
        if !newly_seen.is_empty() {
            self.store
                .mark_images_seen(&session.username, newly_seen)
                .await?;
        }

        if game.game_over() {
            let record = game.result_record(&session.username, session.is_admin);
            self.store.save_daily_record(&record).await?;
            tracing::info!(
                "Daily challenge {} finished for {}: completed={}, score={}",
                record.date,
                record.username,
                record.completed,
                record.score
            );
            session.daily = None;
        }
        Ok(())
    }

    /// Deal a new bonus question
    pub async fn start_bonus(&self, session: &mut UserSession) -> GameResult<()> {
        let all_images = self.store.list_images().await?;
        let seen = self.store.seen_image_ids(&session.username).await?;

        let game = {
            let mut rng = rand::rng();
            select_bonus_images(
                &all_images,
                &seen,
                self.game_config.bonus_choices,
                &mut rng,
            )
        }
        .ok_or_else(|| GameError::NotFound("Enough images for a bonus game".to_string()))?;

        session.bonus = Some(game);
        Ok(())
    }

    /// Answer the bonus question; the question is used up either way
    pub async fn submit_bonus(
        &self,
        session: &mut UserSession,
        selected_index: &str,
    ) -> GameResult<BonusOutcome> {
        let game = session.bonus.as_ref().ok_or(GameError::MissingSessionData)?;
        let index = game.parse_selection(selected_index)?;
        let outcome = {
            let mut rng = rand::rng();
            game.answer(index, &mut rng)
        };
        session.bonus = None;

        self.store
            .mark_images_seen(&session.username, &outcome.image_ids)
            .await?;
        if let Some(ref avatar) = outcome.avatar {
            self.store.award_avatar(&session.username, avatar).await?;
            tracing::info!("{} won avatar {}", session.username, avatar);
        }
        Ok(outcome)
    }
}
