// Public API for integration tests and potential library usage

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod state;
pub mod streaks;
pub mod types;
