use super::bonus::BonusGame;
use super::daily::DailyGame;
use super::AppState;
use crate::auth;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Server-side state of one logged-in user
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: SessionId,
    pub username: Username,
    pub is_admin: bool,
    pub csrf_token: String,
    pub daily: Option<DailyGame>,
    pub bonus: Option<BonusGame>,
    pub last_seen: Instant,
}

impl UserSession {
    pub fn verify_csrf(&self, provided: Option<&str>) -> GameResult<()> {
        auth::verify_csrf(&self.csrf_token, provided)
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

impl AppState {
    /// Create a session for `username`
    pub async fn login(&self, username: &str) -> GameResult<UserSession> {
        let username = auth::validate_username(username)?;
        let session = UserSession {
            id: ulid::Ulid::new().to_string(),
            is_admin: self.is_admin(&username),
            username,
            csrf_token: auth::generate_csrf_token(),
            daily: None,
            bonus: None,
            last_seen: Instant::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session.id.clone(), Arc::new(Mutex::new(session.clone())));

        tracing::info!(
            "User {} logged in (admin: {})",
            session.username,
            session.is_admin
        );
        Ok(session)
    }

    /// Look up the session behind a cookie value
    pub async fn get_session(
        &self,
        session_id: Option<&str>,
    ) -> GameResult<Arc<Mutex<UserSession>>> {
        let session_id = session_id.ok_or(GameError::Unauthenticated)?;
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(GameError::Unauthenticated)
    }

    pub async fn logout(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_some() {
            tracing::info!("Session {} logged out", session_id);
        }
        removed.is_some()
    }

    /// Drop sessions idle for longer than `ttl`. Sessions busy with a request are kept.
    pub async fn expire_idle_sessions(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => now.duration_since(s.last_seen) < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    fn state() -> AppState {
        let admins: HashSet<Username> = ["admin".to_string()].into_iter().collect();
        AppState::new(Arc::new(MemoryStore::new()), GameConfig::default(), admins)
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let state = state();
        let session = state.login("alice").await.unwrap();

        assert_eq!(session.username, "alice");
        assert!(!session.is_admin);
        assert!(!session.csrf_token.is_empty());
        assert!(state.get_session(Some(&session.id)).await.is_ok());
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_admin_flag() {
        let state = state();
        let session = state.login("admin").await.unwrap();
        assert!(session.is_admin);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_username() {
        let state = state();
        assert!(matches!(
            state.login("no spaces please").await,
            Err(GameError::InvalidInput(_))
        ));
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_unauthenticated() {
        let state = state();
        assert!(matches!(
            state.get_session(None).await,
            Err(GameError::Unauthenticated)
        ));
        assert!(matches!(
            state.get_session(Some("nope")).await,
            Err(GameError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_logout() {
        let state = state();
        let session = state.login("alice").await.unwrap();
        assert!(state.logout(&session.id).await);
        assert!(!state.logout(&session.id).await);
        assert!(state.get_session(Some(&session.id)).await.is_err());
    }

    #[tokio::test]
    async fn test_expire_idle_sessions() {
        let state = state();
        let idle = state.login("idle").await.unwrap();
        let active = state.login("active").await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        state
            .get_session(Some(&active.id))
            .await
            .unwrap()
            .lock()
            .await
            .touch();

        let removed = state.expire_idle_sessions(Duration::from_millis(20)).await;
        assert_eq!(removed, 1);
        assert!(state.get_session(Some(&idle.id)).await.is_err());
        assert!(state.get_session(Some(&active.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_csrf() {
        let state = state();
        let session = state.login("alice").await.unwrap();
        assert!(session.verify_csrf(Some(&session.csrf_token)).is_ok());
        assert!(matches!(
            session.verify_csrf(Some("forged")),
            Err(GameError::InvalidCsrfToken)
        ));
    }
}
