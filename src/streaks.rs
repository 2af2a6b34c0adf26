//! Per-user win streak counters.
//!
//! The rule is the same for every game: a win extends the current streak
//! (raising the best streak if passed), a loss resets it to zero.

use crate::types::{GameKind, UserKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Streak store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Streak store data is invalid: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Streak {
    pub current: u32,
    pub max: u32,
}

impl Streak {
    pub fn record(self, won: bool) -> Self {
        if won {
            let current = self.current + 1;
            Self {
                current,
                max: self.max.max(current),
            }
        } else {
            Self {
                current: 0,
                max: self.max,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStreaks {
    #[serde(default)]
    pub autoguessr: Streak,
    #[serde(default)]
    pub autorank: Streak,
}

impl UserStreaks {
    fn streak_mut(&mut self, game: GameKind) -> &mut Streak {
        match game {
            GameKind::Autoguessr => &mut self.autoguessr,
            GameKind::Autorank => &mut self.autorank,
        }
    }

    pub fn record(mut self, game: GameKind, won: bool) -> Self {
        let streak = self.streak_mut(game);
        *streak = streak.record(won);
        self
    }
}

/// Storage for streak counters keyed by an opaque user key
#[async_trait]
pub trait StreakStore: Send + Sync {
    /// Current counters; users never seen before start at zero
    async fn get_streaks(&self, user: &UserKey) -> StoreResult<UserStreaks>;

    /// Apply one game outcome and return the updated counters
    async fn record_result(
        &self,
        user: &UserKey,
        game: GameKind,
        won: bool,
    ) -> StoreResult<UserStreaks>;
}

#[derive(Debug, Default)]
pub struct MemoryStreakStore {
    users: RwLock<HashMap<UserKey, UserStreaks>>,
}

impl MemoryStreakStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreakStore for MemoryStreakStore {
    async fn get_streaks(&self, user: &UserKey) -> StoreResult<UserStreaks> {
        Ok(self.users.read().await.get(user).copied().unwrap_or_default())
    }

    async fn record_result(
        &self,
        user: &UserKey,
        game: GameKind,
        won: bool,
    ) -> StoreResult<UserStreaks> {
        let mut users = self.users.write().await;
        let entry = users.entry(user.clone()).or_default();
        *entry = entry.record(game, won);
        Ok(*entry)
    }
}

/// Streaks persisted as one JSON object, rewritten on every update
#[derive(Debug)]
pub struct JsonFileStreakStore {
    path: PathBuf,
    users: RwLock<HashMap<UserKey, UserStreaks>>,
}

impl JsonFileStreakStore {
    /// Open the store at `path`, starting empty if the file doesn't exist yet
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let users = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Loaded streaks for {} users from {}",
            users.len(),
            path.display()
        );
        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Write to a sibling temp file and rename over the original
    async fn persist(&self, users: &HashMap<UserKey, UserStreaks>) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(users)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StreakStore for JsonFileStreakStore {
    async fn get_streaks(&self, user: &UserKey) -> StoreResult<UserStreaks> {
        Ok(self.users.read().await.get(user).copied().unwrap_or_default())
    }

    async fn record_result(
        &self,
        user: &UserKey,
        game: GameKind,
        won: bool,
    ) -> StoreResult<UserStreaks> {
        // Hold the write lock across the file write so updates land in order
        let mut users = self.users.write().await;
        let previous = users.get(user).copied().unwrap_or_default();
        let updated = previous.record(game, won);
        users.insert(user.clone(), updated);

        if let Err(e) = self.persist(&users).await {
            users.insert(user.clone(), previous);
            return Err(e);
        }
        Ok(updated)
    }
}
