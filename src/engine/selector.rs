//! Daily car selection.
//!
//! Walks year → make → model → trim, consuming exactly one PRNG value per
//! level in that order. The catalog queries run strictly one after another;
//! each needs the previous result and reordering them would change which
//! value each level draws.

use super::rng::{random_index, random_int, Mulberry32};
use super::seed::Seed;
use crate::catalog::{CatalogError, CatalogProvider};
use crate::types::Vehicle;
use serde::Serialize;
use std::fmt;

/// Level of the catalog hierarchy a selection step reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLevel {
    Years,
    Makes,
    Models,
    Trims,
}

impl fmt::Display for CatalogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogLevel::Years => "years",
            CatalogLevel::Makes => "makes",
            CatalogLevel::Models => "models",
            CatalogLevel::Trims => "trims",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    #[error("Catalog returned no {0}")]
    EmptyCatalogLevel(CatalogLevel),
}

/// The selected target and the seed that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCar {
    pub vehicle: Vehicle,
    pub seed: Seed,
}

fn pick<T>(mut items: Vec<T>, level: CatalogLevel, rng: &mut Mulberry32) -> Result<T, SelectError> {
    if items.is_empty() {
        tracing::warn!("Daily selection hit an empty level: {}", level);
        return Err(SelectError::EmptyCatalogLevel(level));
    }
    let index = random_index(items.len(), rng);
    Ok(items.swap_remove(index))
}

/// Deterministically pick the target vehicle for `seed`.
///
/// Fails atomically: any catalog error or empty level aborts the whole
/// selection and no vehicle is returned. No retries happen here.
pub async fn select_daily_car(
    catalog: &dyn CatalogProvider,
    seed: Seed,
) -> Result<DailyCar, SelectError> {
    let mut rng = Mulberry32::new(seed);

    let range = catalog.get_year_range().await?;
    if range.is_empty() {
        tracing::warn!("Catalog reported an empty year range: {:?}", range);
        return Err(SelectError::EmptyCatalogLevel(CatalogLevel::Years));
    }
    let year = random_int(range.min, range.max, &mut rng);

    let makes = catalog.get_makes(year).await?;
    let make = pick(makes, CatalogLevel::Makes, &mut rng)?;

    let models = catalog.get_models(&make.id, year).await?;
    let model = pick(models, CatalogLevel::Models, &mut rng)?;

    let trims = catalog.get_trims(&make.id, &model.name, year).await?;
    let vehicle = pick(trims, CatalogLevel::Trims, &mut rng)?;

    debug_assert_eq!(rng.draws(), 4);
    tracing::debug!(
        "Seed {} selected {} {} {} (id {})",
        seed,
        vehicle.make_id,
        vehicle.model,
        vehicle.year,
        vehicle.id
    );

    Ok(DailyCar { vehicle, seed })
}
