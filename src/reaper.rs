use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that drops sessions idle for longer than `ttl`
pub fn spawn_session_reaper(state: Arc<AppState>, ttl: Duration) {
    let interval = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let removed = state.expire_idle_sessions(ttl).await;
            if removed > 0 {
                tracing::info!(
                    "Expired {} idle session(s), {} active",
                    removed,
                    state.session_count().await
                );
            }
        }
    });
}
