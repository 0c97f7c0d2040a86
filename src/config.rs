//! Runtime configuration, read from environment variables (and `.env`)

use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::types::GameConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub game: GameConfig,
    /// Admins may replay the daily challenge
    pub admin_usernames: HashSet<String>,
    /// Optional JSON file of images loaded at startup
    pub image_manifest: Option<String>,
    /// Idle sessions are dropped after this long
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 6580,
            database_url: "sqlite://realorai.db".to_string(),
            game: GameConfig::default(),
            admin_usernames: HashSet::new(),
            image_manifest: None,
            session_ttl: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        let game_defaults = GameConfig::default();

        let daily_rounds = try_load("DAILY_ROUNDS", game_defaults.daily_rounds);
        let starting_lives = try_load("STARTING_LIVES", game_defaults.starting_lives);
        let bonus_choices = try_load("BONUS_CHOICES", game_defaults.bonus_choices);

        let game = GameConfig {
            daily_rounds: at_least("DAILY_ROUNDS", daily_rounds, 1, game_defaults.daily_rounds),
            starting_lives: at_least(
                "STARTING_LIVES",
                starting_lives,
                1,
                game_defaults.starting_lives,
            ),
            bonus_choices: at_least("BONUS_CHOICES", bonus_choices, 2, game_defaults.bonus_choices),
        };

        let admin_usernames: HashSet<String> = std::env::var("ADMIN_USERNAMES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let image_manifest = std::env::var("IMAGE_MANIFEST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let ttl_minutes = try_load("SESSION_TTL_MINUTES", defaults.session_ttl.as_secs() / 60);

        let config = Self {
            port: try_load("PORT", defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            game,
            admin_usernames,
            image_manifest,
            session_ttl: Duration::from_secs(ttl_minutes.max(1) * 60),
        };

        tracing::info!(
            port = config.port,
            daily_rounds = config.game.daily_rounds,
            starting_lives = config.game.starting_lives,
            bonus_choices = config.game.bonus_choices,
            admins = config.admin_usernames.len(),
            "Config loaded"
        );

        config
    }
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {} value '{}': {}. Using default: {}", key, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}

fn at_least<T: PartialOrd + Display + Copy>(key: &str, value: T, min: T, default: T) -> T {
    if value < min {
        tracing::warn!("{} must be at least {}, using default: {}", key, min, default);
        default
    } else {
        value
    }
}
