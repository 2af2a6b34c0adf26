//! Spec reveal planning.
//!
//! A vehicle's displayable attributes are bucketed by tier, each tier is
//! shuffled with a PRNG seeded from the game seed (tier 3 first, then 2,
//! then 1), and the tiers are concatenated high to low. Difficulty decides
//! how long a prefix of that ordering the player sees.

use super::rng::{shuffle, Mulberry32};
use super::seed::Seed;
use crate::types::{Difficulty, SpecItem, Tier, Vehicle};

/// Where a spec row's value comes from and how it is shown
#[derive(Debug, Clone, Copy)]
enum Display {
    Plain(&'static str),
    Suffix(&'static str, &'static str),
    /// Derived from the model year rather than a catalog attribute
    Decade,
}

struct SpecSource {
    label: &'static str,
    tier: Tier,
    display: Display,
}

/// Table order is also the pre-shuffle order inside each tier
#[rustfmt::skip]
const SPEC_TABLE: &[SpecSource] = &[
    SpecSource { label: "Country", tier: Tier::Major, display: Display::Plain("make_country") },
    SpecSource { label: "Decade", tier: Tier::Major, display: Display::Decade },
    SpecSource { label: "Engine Size", tier: Tier::Moderate, display: Display::Suffix("model_engine_l", "L") },
    SpecSource { label: "Cylinders", tier: Tier::Minor, display: Display::Plain("model_engine_cyl") },
    SpecSource { label: "Engine Type", tier: Tier::Moderate, display: Display::Plain("model_engine_type") },
    SpecSource { label: "Horsepower", tier: Tier::Major, display: Display::Suffix("model_engine_power_hp", " hp") },
    SpecSource { label: "Top Speed", tier: Tier::Major, display: Display::Suffix("model_top_speed_mph", " mph") },
    SpecSource { label: "Weight", tier: Tier::Moderate, display: Display::Suffix("model_weight_lbs", " lbs") },
    SpecSource { label: "Body Style", tier: Tier::Major, display: Display::Plain("model_body") },
    SpecSource { label: "Drive Type", tier: Tier::Major, display: Display::Plain("model_drive") },
    SpecSource { label: "Transmission", tier: Tier::Moderate, display: Display::Plain("model_transmission_type") },
    SpecSource { label: "Seats", tier: Tier::Minor, display: Display::Plain("model_seats") },
    SpecSource { label: "Doors", tier: Tier::Minor, display: Display::Plain("model_doors") },
];

/// Absent, blank, and the catalog's literal "null" all mean "no value"
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && *value != "null")
}

fn decade(year: i32) -> String {
    format!("{}s", year.div_euclid(10) * 10)
}

/// Displayable specs of a vehicle in table order; null attributes are dropped
pub fn spec_items(vehicle: &Vehicle) -> Vec<SpecItem> {
    SPEC_TABLE
        .iter()
        .filter_map(|source| {
            let value = match source.display {
                Display::Decade => decade(vehicle.year),
                Display::Plain(key) => present(vehicle.attribute(key))?.to_string(),
                Display::Suffix(key, unit) => {
                    format!("{}{}", present(vehicle.attribute(key))?, unit)
                }
            };
            Some(SpecItem {
                label: source.label.to_string(),
                value,
                tier: source.tier,
            })
        })
        .collect()
}

/// Seed-dependent reveal order of a vehicle's specs
pub fn plan_reveal(vehicle: &Vehicle, seed: Seed) -> Vec<SpecItem> {
    let items = spec_items(vehicle);
    let mut rng = Mulberry32::new(seed);

    let mut ordered = Vec::with_capacity(items.len());
    for tier in Tier::DESCENDING {
        let mut bucket: Vec<SpecItem> = items.iter().filter(|s| s.tier == tier).cloned().collect();
        shuffle(&mut bucket, &mut rng);
        ordered.extend(bucket);
    }
    ordered
}

/// Number of specs shown for a difficulty after `guess_count` guesses
pub fn visible_count(difficulty: Difficulty, guess_count: usize, total: usize) -> usize {
    let shown = match difficulty {
        Difficulty::Hard => 3,
        Difficulty::Easy => 5 + guess_count,
        Difficulty::Medium => 4 + guess_count / 2,
    };
    shown.min(total)
}

pub fn visible_specs(difficulty: Difficulty, guess_count: usize, ordered: &[SpecItem]) -> &[SpecItem] {
    &ordered[..visible_count(difficulty, guess_count, ordered.len())]
}

/// Specs still locked that further guesses (up to `max_guesses`) would reveal
pub fn reveals_remaining(
    difficulty: Difficulty,
    guess_count: usize,
    max_guesses: usize,
    total: usize,
) -> usize {
    let eventually = visible_count(difficulty, max_guesses.max(guess_count), total);
    eventually - visible_count(difficulty, guess_count, total)
}
