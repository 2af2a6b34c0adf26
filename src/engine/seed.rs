use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("Seed must be a non-negative 32-bit integer, got '{0}'")]
    Malformed(String),
}

/// Integer fully determining one game's pseudo-random outcomes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Seed(i32);

impl Seed {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// `YYYYMMDD` of the given calendar date
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32)
    }

    /// Seed for the local calendar date
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Parse an explicit seed parameter
    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        let trimmed = raw.trim();
        match trimmed.parse::<i32>() {
            Ok(value) if value >= 0 => Ok(Self(value)),
            _ => Err(SeedError::Malformed(trimmed.to_string())),
        }
    }

    /// Explicit seed if given, otherwise today's
    pub fn from_param(raw: Option<&str>) -> Result<Self, SeedError> {
        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::parse(raw),
            _ => Ok(Self::today()),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
