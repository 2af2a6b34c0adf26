//! Ranking mini-game: order a small pool of cars by a stat.
//!
//! The pool is drawn with the same seeded PRNG as the daily puzzle, so a
//! `(seed, stat, count)` triple always reproduces the same pool for the
//! same catalog responses.

use super::rng::{random_int, shuffle, Mulberry32};
use super::seed::Seed;
use super::selector::{CatalogLevel, SelectError};
use crate::catalog::CatalogProvider;
use crate::types::{RankStat, Vehicle, VehicleId, YearRange};
use serde::Serialize;
use std::cmp::Ordering;

/// Oldest model year a pool is drawn from
pub const MIN_RANK_YEAR: i32 = 1970;
pub const DEFAULT_POOL_SIZE: usize = 5;
pub const MAX_POOL_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingPool {
    pub seed: Seed,
    pub stat: RankStat,
    pub year: i32,
    pub vehicles: Vec<Vehicle>,
}

pub fn clamp_pool_size(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_POOL_SIZE)
        .clamp(1, MAX_POOL_SIZE)
}

/// Draw a year, fetch its trims that clear the stat minimum, shuffle, take `count`
pub async fn draw_pool(
    catalog: &dyn CatalogProvider,
    stat: RankStat,
    count: usize,
    seed: Seed,
) -> Result<RankingPool, SelectError> {
    let mut rng = Mulberry32::new(seed);

    let range = catalog.get_year_range().await?;
    let eligible = YearRange {
        min: range.min.max(MIN_RANK_YEAR),
        max: range.max,
    };
    if eligible.is_empty() {
        return Err(SelectError::EmptyCatalogLevel(CatalogLevel::Years));
    }
    let year = random_int(eligible.min, eligible.max, &mut rng);

    let mut vehicles = catalog.get_trims_by_stat(year, stat).await?;
    if vehicles.is_empty() {
        tracing::warn!("No {:?} trims for ranking year {}", stat, year);
        return Err(SelectError::EmptyCatalogLevel(CatalogLevel::Trims));
    }
    shuffle(&mut vehicles, &mut rng);
    vehicles.truncate(count);

    Ok(RankingPool {
        seed,
        stat,
        year,
        vehicles,
    })
}

/// Numeric stat of a vehicle; missing or unparsable counts as zero
pub fn stat_value(vehicle: &Vehicle, stat: RankStat) -> f64 {
    let keys: &[&str] = match stat {
        // Metric horsepower wins when both are present
        RankStat::Horsepower => &["model_engine_power_ps", "model_engine_power_hp"],
        RankStat::Weight => &["model_weight_lbs"],
    };
    keys.iter()
        .find_map(|key| vehicle.attribute(key))
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0.0)
}

/// Vehicle ids from highest to lowest stat; ties keep pool order
pub fn correct_order(vehicles: &[Vehicle], stat: RankStat) -> Vec<VehicleId> {
    let mut ranked: Vec<&Vehicle> = vehicles.iter().collect();
    ranked.sort_by(|a, b| {
        stat_value(b, stat)
            .partial_cmp(&stat_value(a, stat))
            .unwrap_or(Ordering::Equal)
    });
    ranked.into_iter().map(|v| v.id.clone()).collect()
}

pub fn check_ranking(vehicles: &[Vehicle], stat: RankStat, order: &[VehicleId]) -> bool {
    !vehicles.is_empty() && correct_order(vehicles, stat) == order
}
