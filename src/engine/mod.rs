//! Deterministic puzzle engine.
//!
//! Everything here is a pure function of its inputs (a seed, catalog
//! responses, a guess history). Same seed, same car, same reveal order.

pub mod evaluator;
pub mod game;
pub mod ranking;
pub mod reveal;
pub mod rng;
pub mod seed;
pub mod selector;

pub use evaluator::{evaluate_guess, GuessError};
pub use game::{GameError, GameSession, MAX_GUESSES};
pub use seed::{Seed, SeedError};
pub use selector::{select_daily_car, CatalogLevel, DailyCar, SelectError};
