use crate::error::{GameError, GameResult};
use crate::types::{FinalRound, Image, ImageKind};

/// A submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerToken {
    Real,
    Ai,
    LeftReal,
    RightReal,
}

impl AnswerToken {
    pub fn parse(value: &str) -> GameResult<Self> {
        match value.trim() {
            "real" => Ok(AnswerToken::Real),
            "ai" => Ok(AnswerToken::Ai),
            "left_real" => Ok(AnswerToken::LeftReal),
            "right_real" => Ok(AnswerToken::RightReal),
            other => Err(GameError::invalid(format!("Invalid answer: {}", other))),
        }
    }
}

/// Is `answer` right for a single-image round?
pub fn evaluate_regular(answer: AnswerToken, image: &Image) -> GameResult<bool> {
    let guessed = match answer {
        AnswerToken::Real => ImageKind::Real,
        AnswerToken::Ai => ImageKind::Ai,
        _ => {
            return Err(GameError::invalid(
                "Answer must be 'real' or 'ai' for this round",
            ))
        }
    };
    Ok(guessed == image.kind)
}

/// Is `answer` right for the side-by-side final round?
pub fn evaluate_final(answer: AnswerToken, final_round: &FinalRound) -> GameResult<bool> {
    match answer {
        AnswerToken::LeftReal => Ok(final_round.left_is_real),
        AnswerToken::RightReal => Ok(!final_round.left_is_real),
        _ => Err(GameError::invalid(
            "Answer must be 'left_real' or 'right_real' for the final round",
        )),
    }
}
