//! Daily challenge progress
//!
//! `DailyGame` holds the per-user state of today's challenge. All transitions
//! are synchronous; the async handlers in `state::game` wrap them with the
//! store lookups and persistence writes.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::error::{GameError, GameResult};
use crate::types::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyGame {
    pub date: String,
    pub round: u32,
    pub current_image_index: usize,
    pub lives: u32,
    pub score: u32,
    pub streak: u32,
    pub total_rounds: u32,
    pub images: Vec<Image>,
    pub phase: DailyPhase,
    pub final_round: Option<FinalRound>,
    pub seen_image_ids: Vec<ImageId>,
}

/// What a single answer did to the game
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points: u32,
    pub phase: DailyPhase,
    /// Counters after the answer was applied
    pub status: DailyStatus,
}

/// Counters and the next thing to show, detached from the session
#[derive(Debug, Clone, PartialEq)]
pub struct DailyStatus {
    pub round: u32,
    pub total_rounds: u32,
    pub lives: u32,
    pub score: u32,
    pub streak: u32,
    pub phase: DailyPhase,
    pub next_image: Option<Image>,
    pub final_round: Option<FinalRound>,
}

impl DailyGame {
    pub fn new(
        date: String,
        images: Vec<Image>,
        final_round: Option<FinalRound>,
        starting_lives: u32,
    ) -> Self {
        Self {
            date,
            round: 1,
            current_image_index: 0,
            lives: starting_lives,
            score: 0,
            streak: 0,
            total_rounds: images.len() as u32,
            images,
            phase: DailyPhase::InProgress,
            final_round,
            seen_image_ids: Vec::new(),
        }
    }

    /// Rebuild an unfinished game from its stored progress. `images` and
    /// `final_round` must be the same daily selection the game started with.
    pub fn resume(
        images: Vec<Image>,
        final_round: Option<FinalRound>,
        progress: &ProgressSnapshot,
    ) -> Self {
        let total_rounds = images.len() as u32;
        let round = progress.round.max(1);
        let phase = if progress.lives == 0 {
            DailyPhase::Failed
        } else if round > total_rounds {
            if final_round.is_some() {
                DailyPhase::FinalRound
            } else {
                DailyPhase::Completed
            }
        } else {
            DailyPhase::InProgress
        };

        Self {
            date: progress.date.clone(),
            round,
            current_image_index: (round - 1) as usize,
            lives: progress.lives,
            score: progress.score,
            streak: progress.streak,
            total_rounds,
            images,
            phase,
            final_round,
            seen_image_ids: progress
                .seen_image_ids
                .split(',')
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn current_image(&self) -> Option<&Image> {
        if self.phase != DailyPhase::InProgress {
            return None;
        }
        self.images.get(self.current_image_index)
    }

    pub fn game_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Check that a regular answer for `image_id` is acceptable right now
    pub fn expect_regular_answer(&self, image_id: &str) -> GameResult<()> {
        match self.phase {
            DailyPhase::InProgress => {}
            DailyPhase::FinalRound => {
                return Err(GameError::invalid(
                    "The final round is in progress, submit a final round answer",
                ))
            }
            DailyPhase::Completed | DailyPhase::Failed => {
                return Err(GameError::invalid("The game is over"))
            }
        }

        let current = self
            .current_image()
            .ok_or(GameError::MissingSessionData)?;
        if current.id != image_id {
            return Err(GameError::invalid("Image does not match the current round"));
        }
        Ok(())
    }

    /// Apply the result of a regular round
    pub fn record_regular_answer(&mut self, correct: bool) -> AnswerOutcome {
        let points = if correct {
            self.score += REGULAR_ROUND_POINTS;
            self.streak += 1;
            REGULAR_ROUND_POINTS
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.streak = 0;
            0
        };

        if let Some(image) = self.images.get(self.current_image_index) {
            self.seen_image_ids.push(image.id.clone());
        }
        self.round += 1;
        self.current_image_index += 1;

        if self.lives == 0 {
            self.phase = DailyPhase::Failed;
        } else if self.round > self.total_rounds {
            self.phase = if self.final_round.is_some() {
                DailyPhase::FinalRound
            } else {
                DailyPhase::Completed
            };
        }

        AnswerOutcome {
            correct,
            points,
            phase: self.phase.clone(),
            status: self.status(),
        }
    }

    /// The final round, if it is the one being played
    pub fn expect_final_answer(&self) -> GameResult<&FinalRound> {
        match self.phase {
            DailyPhase::FinalRound => self
                .final_round
                .as_ref()
                .ok_or(GameError::MissingSessionData),
            DailyPhase::InProgress => Err(GameError::invalid(
                "The final round has not started yet",
            )),
            DailyPhase::Completed | DailyPhase::Failed => {
                Err(GameError::invalid("The game is over"))
            }
        }
    }

    /// Apply the result of the final round. Always ends the game.
    pub fn record_final_answer(&mut self, correct: bool) -> AnswerOutcome {
        let points = if correct {
            self.score += FINAL_ROUND_POINTS;
            self.streak += 1;
            FINAL_ROUND_POINTS
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.streak = 0;
            0
        };

        if let Some(ref fr) = self.final_round {
            self.seen_image_ids.push(fr.real_image_id.clone());
            self.seen_image_ids.push(fr.ai_image_id.clone());
        }

        self.phase = if self.lives == 0 {
            DailyPhase::Failed
        } else {
            DailyPhase::Completed
        };

        AnswerOutcome {
            correct,
            points,
            phase: self.phase.clone(),
            status: self.status(),
        }
    }

    /// Give up; an unfinished game counts as failed
    pub fn abandon(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = DailyPhase::Failed;
        }
    }

    pub fn status(&self) -> DailyStatus {
        DailyStatus {
            round: self.round,
            total_rounds: self.total_rounds,
            lives: self.lives,
            score: self.score,
            streak: self.streak,
            phase: self.phase.clone(),
            next_image: self.current_image().cloned(),
            final_round: if self.phase == DailyPhase::FinalRound {
                self.final_round.clone()
            } else {
                None
            },
        }
    }

    pub fn snapshot(&self, username: &str) -> ProgressSnapshot {
        ProgressSnapshot {
            username: username.to_string(),
            date: self.date.clone(),
            round: self.round,
            lives: self.lives,
            score: self.score,
            streak: self.streak,
            game_over: self.game_over(),
            seen_image_ids: self.seen_image_ids.join(","),
        }
    }

    pub fn result_record(&self, username: &str, is_admin: bool) -> DailyChallengeRecord {
        DailyChallengeRecord {
            username: username.to_string(),
            date: self.date.clone(),
            completed: self.phase == DailyPhase::Completed,
            is_admin,
            score: self.score,
            lives: self.lives,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Seed derived from the date so every player gets the same challenge that day
pub fn daily_seed(date: &str) -> u64 {
    let digest = Sha256::digest(format!("daily-challenge:{}", date).as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Pick today's images and final round pair.
/// Returns `None` if there are fewer than `rounds` images.
pub fn select_daily_images(
    all_images: &[Image],
    date: &str,
    rounds: usize,
) -> Option<(Vec<Image>, Option<FinalRound>)> {
    if rounds == 0 || all_images.len() < rounds {
        return None;
    }

    let mut pool: Vec<Image> = all_images.to_vec();
    pool.sort_by(|a, b| a.id.cmp(&b.id));

    let mut rng = StdRng::seed_from_u64(daily_seed(date));
    pool.shuffle(&mut rng);

    let remaining = pool.split_off(rounds);
    let chosen = pool;

    // Prefer images not already used in the regular rounds
    let pick_kind = |kind: ImageKind, rng: &mut StdRng| -> Option<Image> {
        let unused: Vec<&Image> = remaining.iter().filter(|i| i.kind == kind).collect();
        if let Some(image) = unused.choose(&mut *rng) {
            return Some((*image).clone());
        }
        let used: Vec<&Image> = chosen.iter().filter(|i| i.kind == kind).collect();
        used.choose(&mut *rng).map(|i| (*i).clone())
    };

    let real = pick_kind(ImageKind::Real, &mut rng);
    let ai = pick_kind(ImageKind::Ai, &mut rng);
    let final_round = match (real, ai) {
        (Some(real), Some(ai)) => Some(FinalRound {
            real_image_id: real.id,
            ai_image_id: ai.id,
            left_is_real: rng.random_bool(0.5),
        }),
        _ => None,
    };

    Some((chosen, final_round))
}
