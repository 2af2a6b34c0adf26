use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type VehicleId = String;
pub type MakeId = String;
pub type GameId = String;
pub type UserKey = String;

/// Inclusive range of model years the catalog knows about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Range reported by a catalog with no years at all
    pub const EMPTY: YearRange = YearRange { min: 1, max: 0 };

    /// True when no year lies in the range (`min > max`)
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Make {
    pub id: MakeId,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelName {
    pub name: String,
}

/// A single trim of a model in a given year.
///
/// `attributes` holds the raw catalog fields (engine size, horsepower, body
/// style, ...) keyed by their catalog name. A `BTreeMap` keeps iteration
/// order stable across hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub make_id: MakeId,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Vehicle {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Priority bucket controlling which specs are revealed earliest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Minor,
    Moderate,
    Major,
}

impl Tier {
    /// Tier visitation order for shuffling and concatenation (3, 2, 1)
    pub const DESCENDING: [Tier; 3] = [Tier::Major, Tier::Moderate, Tier::Minor];

    pub fn rank(self) -> u8 {
        match self {
            Tier::Minor => 1,
            Tier::Moderate => 2,
            Tier::Major => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecItem {
    pub label: String,
    pub value: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Raw player input for one guess
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guess {
    pub make: String,
    pub model: String,
    pub year: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Correct,
    Close,
    Wrong,
}

/// Which way the true year lies relative to a wrong year guess
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessFeedback {
    pub make: Feedback,
    pub model: Feedback,
    pub year: Feedback,
}

impl GuessFeedback {
    pub fn is_win(&self) -> bool {
        self.make == Feedback::Correct
            && self.model == Feedback::Correct
            && self.year == Feedback::Correct
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessRecord {
    pub guess: Guess,
    pub feedback: GuessFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// Games that keep a streak counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Autoguessr,
    Autorank,
}

/// Stat a ranking pool is drawn for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankStat {
    #[default]
    Horsepower,
    Weight,
}

/// Autocomplete suggestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub value: String,
    pub label: String,
}
