//! Guess scoring: normalization, alias resolution and fuzzy model matching.

use crate::types::{Direction, Feedback, Guess, GuessFeedback, GuessRecord, Vehicle};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Informal brand names mapped to their normalized canonical form
pub const BRAND_ALIASES: &[(&str, &str)] = &[
    ("chevy", "chevrolet"),
    ("vw", "volkswagen"),
    ("merc", "mercedes"),
    ("mercedesbenz", "mercedes"),
    ("benz", "mercedes"),
    ("beemer", "bmw"),
    ("bimmer", "bmw"),
    ("caddy", "cadillac"),
    ("alfa", "alfaromeo"),
];

/// Year guesses this close (inclusive) are `close`
const YEAR_TOLERANCE: i32 = 5;
/// Largest edit distance that can still count as `close`
const MAX_MODEL_DISTANCE: usize = 2;
/// Shortest substring that counts as containment
const MIN_CONTAINED_LEN: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuessError {
    #[error("Invalid guess input: {field} {reason}")]
    InvalidGuessInput {
        field: &'static str,
        reason: &'static str,
    },
}

/// Lowercase, strip diacritics, and drop whitespace, hyphens and underscores
pub fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// Equality after normalization, letting `input` go through `aliases` once
pub fn lingo_match(input: &str, target: &str, aliases: &[(&str, &str)]) -> bool {
    let input = normalize(input);
    let target = normalize(target);
    if input == target {
        return true;
    }

    aliases
        .iter()
        .find(|(alias, _)| *alias == input)
        .is_some_and(|(_, canonical)| *canonical == target)
}

/// Unit-cost insert/delete/substitute edit distance over chars
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

pub fn evaluate_make(guess: &str, target: &str) -> Feedback {
    if lingo_match(guess, target, BRAND_ALIASES) {
        Feedback::Correct
    } else {
        Feedback::Wrong
    }
}

pub fn evaluate_model(guess: &str, target: &str) -> Feedback {
    if lingo_match(guess, target, &[]) {
        return Feedback::Correct;
    }

    let guess = normalize(guess);
    let target = normalize(target);
    let guess_len = guess.chars().count();
    let target_len = target.chars().count();

    let contained = (guess_len >= MIN_CONTAINED_LEN && target.contains(&guess))
        || (target_len >= MIN_CONTAINED_LEN && guess.contains(&target));
    if contained {
        return Feedback::Close;
    }

    let longest = guess_len.max(target_len);
    let distance = levenshtein(&guess, &target);
    if longest > 0 && distance <= MAX_MODEL_DISTANCE && (distance as f64 / longest as f64) < 0.5 {
        Feedback::Close
    } else {
        Feedback::Wrong
    }
}

/// Year feedback and, unless correct, which way the true year lies
pub fn evaluate_year(guess: i32, target: i32) -> (Feedback, Option<Direction>) {
    if guess == target {
        return (Feedback::Correct, None);
    }

    let feedback = if (guess - target).abs() <= YEAR_TOLERANCE {
        Feedback::Close
    } else {
        Feedback::Wrong
    };
    let direction = if guess < target {
        Direction::Higher
    } else {
        Direction::Lower
    };
    (feedback, Some(direction))
}

/// Trimmed, validated guess with its parsed year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidGuess {
    guess: Guess,
    year: i32,
}

impl ValidGuess {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn guess(&self) -> &Guess {
        &self.guess
    }
}

fn require(value: &str, field: &'static str) -> Result<String, GuessError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GuessError::InvalidGuessInput {
            field,
            reason: "is missing",
        });
    }
    Ok(trimmed.to_string())
}

/// Reject missing fields and non-numeric years before anything is scored
pub fn validate_guess(guess: &Guess) -> Result<ValidGuess, GuessError> {
    let make = require(&guess.make, "make")?;
    let model = require(&guess.model, "model")?;
    let year_text = require(&guess.year, "year")?;

    if !year_text.chars().all(|c| c.is_ascii_digit()) {
        return Err(GuessError::InvalidGuessInput {
            field: "year",
            reason: "must be a whole number",
        });
    }
    let year: i32 = year_text.parse().map_err(|_| GuessError::InvalidGuessInput {
        field: "year",
        reason: "is out of range",
    })?;

    Ok(ValidGuess {
        guess: Guess {
            make,
            model,
            // Canonical decimal form, so "02000" and "2000" compare equal
            year: year.to_string(),
        },
        year,
    })
}

/// Score a validated guess against the target
pub fn score_guess(guess: ValidGuess, target: &Vehicle) -> GuessRecord {
    let (year, direction) = evaluate_year(guess.year, target.year);
    let feedback = GuessFeedback {
        make: evaluate_make(&guess.guess.make, &target.make_id),
        model: evaluate_model(&guess.guess.model, &target.model),
        year,
    };

    GuessRecord {
        guess: guess.guess,
        feedback,
        direction,
    }
}

pub fn evaluate_guess(guess: &Guess, target: &Vehicle) -> Result<GuessRecord, GuessError> {
    let valid = validate_guess(guess)?;
    Ok(score_guess(valid, target))
}
