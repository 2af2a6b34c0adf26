mod session;

use crate::catalog::CatalogProvider;
use crate::engine::GameSession;
use crate::streaks::{MemoryStreakStore, StreakStore};
use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub use session::{Answer, GameView, SessionError};

/// A live game plus who is playing it
#[derive(Debug, Clone)]
pub struct GameEntry {
    pub session: GameSession,
    pub user: Option<UserKey>,
    pub created_at: DateTime<Utc>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub streaks: Arc<dyn StreakStore>,
    pub games: Arc<RwLock<HashMap<GameId, GameEntry>>>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogProvider>, streaks: Arc<dyn StreakStore>) -> Self {
        Self {
            catalog,
            streaks,
            games: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// State with an in-memory streak store
    pub fn with_catalog(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self::new(catalog, Arc::new(MemoryStreakStore::new()))
    }

    /// Record a finished game for a user; failures are logged, never surfaced
    pub async fn record_outcome(&self, user: &UserKey, game: GameKind, won: bool) {
        match self.streaks.record_result(user, game, won).await {
            Ok(streaks) => tracing::info!(
                "Recorded {:?} {} for {}: {:?}",
                game,
                if won { "win" } else { "loss" },
                user,
                streaks
            ),
            Err(e) => tracing::error!("Failed to record {:?} result for {}: {}", game, user, e),
        }
    }

    /// Drop sessions older than `max_age`; returns how many were removed
    pub async fn prune_sessions(&self, max_age: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };
        let mut games = self.games.write().await;
        let before = games.len();
        games.retain(|_, entry| entry.created_at >= cutoff);
        before - games.len()
    }
}

/// Spawn a background task that periodically drops stale game sessions
pub fn spawn_session_pruner(state: Arc<AppState>, max_age: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(600)).await;
            let removed = state.prune_sessions(max_age).await;
            if removed > 0 {
                tracing::debug!("Pruned {} stale game sessions", removed);
            }
        }
    });
}
