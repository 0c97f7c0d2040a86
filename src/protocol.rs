use crate::bots::{BotName, MAX_BOT_NAMES_PER_REQUEST};
use crate::error::{GameError, GameResult};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Form body shared by every `/api/*` endpoint. Unused fields stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    pub action: Option<String>,
    pub answer: Option<String>,
    pub image_id: Option<String>,
    pub selected_index: Option<String>,
    pub count: Option<String>,
    pub csrf_token: Option<String>,
    pub username: Option<String>,
}

impl ActionRequest {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("").trim()
    }
}

fn required(value: &Option<String>, name: &str) -> GameResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(GameError::invalid(format!("Missing {}", name))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DailyAction {
    Start,
    Answer { image_id: ImageId, answer: String },
    FinalAnswer { answer: String },
    State,
    Abandon,
}

impl DailyAction {
    /// Actions that do not change anything and skip the CSRF check
    pub fn is_read_only(action: &str) -> bool {
        action == "state"
    }

    pub fn parse(req: &ActionRequest) -> GameResult<Self> {
        match req.action() {
            "start" => Ok(DailyAction::Start),
            "answer" => Ok(DailyAction::Answer {
                image_id: required(&req.image_id, "image_id")?,
                answer: required(&req.answer, "answer")?,
            }),
            "final_answer" => Ok(DailyAction::FinalAnswer {
                answer: required(&req.answer, "answer")?,
            }),
            "state" => Ok(DailyAction::State),
            "abandon" => Ok(DailyAction::Abandon),
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BonusAction {
    Start,
    Submit { selected_index: String },
}

impl BonusAction {
    pub fn parse(req: &ActionRequest) -> GameResult<Self> {
        match req.action() {
            "start" => Ok(BonusAction::Start),
            "submit" => Ok(BonusAction::Submit {
                selected_index: required(&req.selected_index, "selected_index")?,
            }),
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BotsAction {
    Generate { count: usize },
}

impl BotsAction {
    pub fn parse(req: &ActionRequest) -> GameResult<Self> {
        match req.action() {
            "generate" => {
                let count = match req.count.as_deref().map(str::trim) {
                    None | Some("") => 1,
                    Some(raw) => raw.parse::<usize>().unwrap_or(0),
                };
                if !(1..=MAX_BOT_NAMES_PER_REQUEST).contains(&count) {
                    return Err(GameError::invalid(format!(
                        "Count must be between 1 and {}",
                        MAX_BOT_NAMES_PER_REQUEST
                    )));
                }
                Ok(BotsAction::Generate { count })
            }
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

/// Every endpoint answers with this shape; payload fields sit at the top level
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
}

impl ApiResponse {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            message: None,
            payload: Some(payload),
        }
    }

    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            payload: None,
        }
    }

    pub fn error(err: &GameError) -> Self {
        Self {
            success: false,
            message: Some(err.client_message()),
            payload: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    Login(LoginPayload),
    Daily(DailyPayload),
    DailyResult(DailyResultPayload),
    Bonus(BonusPayload),
    Bots(BotsPayload),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginPayload {
    pub username: Username,
    pub csrf_token: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinalRoundView {
    pub left: ImageView,
    pub right: ImageView,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    pub score: u32,
    pub lives: u32,
    pub streak: u32,
    pub round: u32,
    pub total_rounds: u32,
    pub phase: DailyPhase,
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_image: Option<ImageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_round: Option<FinalRoundView>,
}

/// Today's stored result, returned when no game is running
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyResultPayload {
    pub date: String,
    pub completed: bool,
    pub score: u32,
    pub lives: u32,
    pub game_over: bool,
}

impl From<DailyChallengeRecord> for DailyResultPayload {
    fn from(record: DailyChallengeRecord) -> Self {
        Self {
            date: record.date,
            completed: record.completed,
            score: record.score,
            lives: record.lives,
            game_over: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BonusPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BotsPayload {
    pub bot_names: Vec<BotName>,
}
