use serde::{Deserialize, Serialize};

/// Opaque ID types for readability
pub type ImageId = String;
pub type SessionId = String;
pub type Username = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Real,
    Ai,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Real => "real",
            ImageKind::Ai => "ai",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "real" => Some(ImageKind::Real),
            "ai" => Some(ImageKind::Ai),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub kind: ImageKind,
    pub url: String,
}

/// What the client gets to see of an image (the kind stays server-side)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageView {
    pub id: ImageId,
    pub url: String,
}

impl From<&Image> for ImageView {
    fn from(image: &Image) -> Self {
        Self {
            id: image.id.clone(),
            url: image.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyPhase {
    InProgress,
    FinalRound,
    Completed,
    Failed,
}

impl DailyPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DailyPhase::Completed | DailyPhase::Failed)
    }
}

/// The two images of the side-by-side final round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalRound {
    pub real_image_id: ImageId,
    pub ai_image_id: ImageId,
    pub left_is_real: bool,
}

impl FinalRound {
    pub fn left_image_id(&self) -> &ImageId {
        if self.left_is_real {
            &self.real_image_id
        } else {
            &self.ai_image_id
        }
    }

    pub fn right_image_id(&self) -> &ImageId {
        if self.left_is_real {
            &self.ai_image_id
        } else {
            &self.real_image_id
        }
    }
}

/// Result of a daily challenge, one per user and day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyChallengeRecord {
    pub username: Username,
    pub date: String,
    pub completed: bool,
    pub is_admin: bool,
    pub score: u32,
    pub lives: u32,
    pub finished_at: String,
}

/// Snapshot of a running daily challenge, upserted after every answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub username: Username,
    pub date: String,
    pub round: u32,
    pub lives: u32,
    pub score: u32,
    pub streak: u32,
    pub game_over: bool,
    /// Comma-joined image ids
    pub seen_image_ids: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    pub daily_rounds: u32,
    pub starting_lives: u32,
    pub bonus_choices: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            daily_rounds: 10,
            starting_lives: 3,
            bonus_choices: 4,
        }
    }
}

/// Cosmetic rewards handed out by the bonus game
pub const BONUS_AVATARS: &[&str] = &[
    "robot-detective",
    "pixel-owl",
    "camera-cat",
    "neon-fox",
    "glitch-bunny",
    "lens-panda",
];

pub const REGULAR_ROUND_POINTS: u32 = 10;
pub const FINAL_ROUND_POINTS: u32 = 20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_kind_parse() {
        assert_eq!(ImageKind::parse("real"), Some(ImageKind::Real));
        assert_eq!(ImageKind::parse("ai"), Some(ImageKind::Ai));
        assert_eq!(ImageKind::parse("AI"), None);
        assert_eq!(ImageKind::Ai.as_str(), "ai");
    }

    #[test]
    fn test_final_round_sides() {
        let fr = FinalRound {
            real_image_id: "r".to_string(),
            ai_image_id: "a".to_string(),
            left_is_real: false,
        };
        assert_eq!(fr.left_image_id(), "a");
        assert_eq!(fr.right_image_id(), "r");
    }

    #[test]
    fn test_image_view_hides_kind() {
        let image = Image {
            id: "img1".to_string(),
            kind: ImageKind::Real,
            url: "/img/1.jpg".to_string(),
        };
        let json = serde_json::to_value(ImageView::from(&image)).unwrap();
        assert!(json.get("kind").is_none());
        assert_eq!(json["id"], "img1");
    }
}
