use super::evaluator::{evaluate_guess, GuessError};
use super::reveal::{plan_reveal, reveals_remaining, visible_specs};
use super::seed::Seed;
use super::selector::DailyCar;
use crate::types::{Difficulty, GameStatus, Guess, GuessRecord, SpecItem, Vehicle};

/// Guesses allowed per game
pub const MAX_GUESSES: usize = 6;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    InvalidGuess(#[from] GuessError),

    #[error("Game is already over ({0:?})")]
    GameOver(GameStatus),
}

/// Status as a pure function of the guess history
pub fn game_status(history: &[GuessRecord], forfeited: bool) -> GameStatus {
    if history.iter().any(|record| record.feedback.is_win()) {
        GameStatus::Won
    } else if forfeited || history.len() >= MAX_GUESSES {
        GameStatus::Lost
    } else {
        GameStatus::Playing
    }
}

/// One player's game against one target vehicle.
///
/// The reveal order is computed once from the seed; the history only ever
/// grows while the game is playing.
#[derive(Debug, Clone)]
pub struct GameSession {
    seed: Seed,
    difficulty: Difficulty,
    target: Vehicle,
    specs: Vec<SpecItem>,
    history: Vec<GuessRecord>,
    forfeited: bool,
}

impl GameSession {
    pub fn new(daily: DailyCar, difficulty: Difficulty) -> Self {
        let specs = plan_reveal(&daily.vehicle, daily.seed);
        Self {
            seed: daily.seed,
            difficulty,
            target: daily.vehicle,
            specs,
            history: Vec::new(),
            forfeited: false,
        }
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn target(&self) -> &Vehicle {
        &self.target
    }

    pub fn history(&self) -> &[GuessRecord] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        game_status(&self.history, self.forfeited)
    }

    pub fn is_over(&self) -> bool {
        self.status() != GameStatus::Playing
    }

    pub fn total_specs(&self) -> usize {
        self.specs.len()
    }

    pub fn visible_specs(&self) -> &[SpecItem] {
        visible_specs(self.difficulty, self.history.len(), &self.specs)
    }

    pub fn reveals_remaining(&self) -> usize {
        if self.is_over() {
            return 0;
        }
        reveals_remaining(
            self.difficulty,
            self.history.len(),
            MAX_GUESSES,
            self.specs.len(),
        )
    }

    /// Score a guess and append it. Invalid input leaves the history untouched.
    pub fn submit_guess(&mut self, guess: &Guess) -> Result<GuessRecord, GameError> {
        let status = self.status();
        if status != GameStatus::Playing {
            return Err(GameError::GameOver(status));
        }

        let record = evaluate_guess(guess, &self.target)?;
        self.history.push(record.clone());
        Ok(record)
    }

    /// Give up; `playing → lost`
    pub fn forfeit(&mut self) -> Result<(), GameError> {
        let status = self.status();
        if status != GameStatus::Playing {
            return Err(GameError::GameOver(status));
        }
        self.forfeited = true;
        Ok(())
    }
}
