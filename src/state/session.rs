use super::{AppState, GameEntry};
use crate::engine::{select_daily_car, GameError, GameSession, Seed, SelectError, MAX_GUESSES};
use crate::types::*;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Game not found: {0}")]
    NotFound(GameId),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// The target, disclosed once a game is over
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Answer {
    pub model_id: VehicleId,
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// What a client sees of a game
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameView {
    pub id: GameId,
    pub seed: Seed,
    pub difficulty: Difficulty,
    pub status: GameStatus,
    pub guesses: Vec<GuessRecord>,
    pub visible_specs: Vec<SpecItem>,
    pub total_specs: usize,
    pub max_guesses: usize,
    pub reveals_remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
}

impl GameView {
    fn new(id: &GameId, session: &GameSession) -> Self {
        let answer = session.is_over().then(|| {
            let target = session.target();
            Answer {
                model_id: target.id.clone(),
                make: target.make_id.clone(),
                model: target.model.clone(),
                year: target.year,
            }
        });

        Self {
            id: id.clone(),
            seed: session.seed(),
            difficulty: session.difficulty(),
            status: session.status(),
            guesses: session.history().to_vec(),
            visible_specs: session.visible_specs().to_vec(),
            total_specs: session.total_specs(),
            max_guesses: MAX_GUESSES,
            reveals_remaining: session.reveals_remaining(),
            answer,
        }
    }
}

impl AppState {
    /// Select the car for `seed` and open a new game against it
    pub async fn create_game(
        &self,
        difficulty: Difficulty,
        seed: Seed,
        user: Option<UserKey>,
    ) -> Result<(GameId, GameView), SelectError> {
        let daily = select_daily_car(self.catalog.as_ref(), seed).await?;
        let session = GameSession::new(daily, difficulty);
        let id = ulid::Ulid::new().to_string();
        let view = GameView::new(&id, &session);

        tracing::info!(
            "Created game {} (seed {}, {:?}, {} specs)",
            id,
            seed,
            difficulty,
            session.total_specs()
        );

        self.games.write().await.insert(
            id.clone(),
            GameEntry {
                session,
                user,
                created_at: Utc::now(),
            },
        );
        Ok((id, view))
    }

    pub async fn get_game(&self, id: &GameId) -> Option<GameView> {
        self.games
            .read()
            .await
            .get(id)
            .map(|entry| GameView::new(id, &entry.session))
    }

    /// Score a guess; records the streak if this guess ends the game
    pub async fn submit_guess(
        &self,
        id: &GameId,
        guess: &Guess,
    ) -> Result<(GuessRecord, GameView), SessionError> {
        let (record, view, finished_for) = {
            let mut games = self.games.write().await;
            let entry = games
                .get_mut(id)
                .ok_or_else(|| SessionError::NotFound(id.clone()))?;

            let record = entry.session.submit_guess(guess)?;
            let view = GameView::new(id, &entry.session);
            let finished_for = entry
                .session
                .is_over()
                .then(|| entry.user.clone())
                .flatten();
            (record, view, finished_for)
        };

        if view.status != GameStatus::Playing {
            tracing::info!("Game {} ended: {:?}", id, view.status);
        }
        if let Some(user) = finished_for {
            self.record_outcome(&user, GameKind::Autoguessr, view.status == GameStatus::Won)
                .await;
        }
        Ok((record, view))
    }

    /// Give up a game in progress
    pub async fn forfeit_game(&self, id: &GameId) -> Result<GameView, SessionError> {
        let (view, user) = {
            let mut games = self.games.write().await;
            let entry = games
                .get_mut(id)
                .ok_or_else(|| SessionError::NotFound(id.clone()))?;
            entry.session.forfeit()?;
            (GameView::new(id, &entry.session), entry.user.clone())
        };

        tracing::info!("Game {} forfeited", id);
        if let Some(user) = user {
            self.record_outcome(&user, GameKind::Autoguessr, false).await;
        }
        Ok(view)
    }
}
