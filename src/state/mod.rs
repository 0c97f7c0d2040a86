pub mod bonus;
pub mod daily;
pub mod evaluator;
mod game;
mod session;

pub use session::UserSession;

use crate::store::{BotNameSource, Store};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub bot_names: Arc<dyn BotNameSource>,
    pub game_config: GameConfig,
    pub admin_usernames: Arc<HashSet<Username>>,
    /// Each session has its own lock so one user's requests run one at a time
    pub sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<UserSession>>>>>,
}

impl AppState {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        game_config: GameConfig,
        admin_usernames: HashSet<Username>,
    ) -> Self {
        Self {
            store: store.clone(),
            bot_names: store,
            game_config,
            admin_usernames: Arc::new(admin_usernames),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replace the bot name tables source
    pub fn with_bot_names(mut self, source: Arc<dyn BotNameSource>) -> Self {
        self.bot_names = source;
        self
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_usernames.contains(username)
    }

    /// Today's date as used for daily challenge records
    pub fn today() -> String {
        chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_is_admin() {
        let admins: HashSet<Username> = ["root".to_string()].into_iter().collect();
        let state = AppState::new(Arc::new(MemoryStore::new()), GameConfig::default(), admins);
        assert!(state.is_admin("root"));
        assert!(!state.is_admin("alice"));
    }

    #[test]
    fn test_today_format() {
        let today = AppState::today();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }
}
