mod carquery;
mod fixture;

use crate::types::{Make, ModelName, RankStat, Vehicle, YearRange};
use async_trait::async_trait;
use std::time::Duration;

pub use carquery::CarQueryProvider;
pub use fixture::{CatalogFixture, StaticCatalog};

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to a vehicle catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Unavailable(String),

    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog response parsing failed: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not supported by this catalog: {0}")]
    Unsupported(&'static str),
}

/// Read-only access to a makes/models/trims-by-year vehicle catalog.
///
/// Implementations must be safe to share between concurrent game sessions;
/// none of the methods may keep per-caller state.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Inclusive range of model years available
    async fn get_year_range(&self) -> CatalogResult<YearRange>;

    /// Makes sold in the given year
    async fn get_makes(&self, year: i32) -> CatalogResult<Vec<Make>>;

    /// Models of a make in the given year
    async fn get_models(&self, make_id: &str, year: i32) -> CatalogResult<Vec<ModelName>>;

    /// Trims of a model in the given year, with their spec attributes
    async fn get_trims(&self, make_id: &str, model: &str, year: i32)
        -> CatalogResult<Vec<Vehicle>>;

    /// Full record for a single trim id
    async fn get_vehicle(&self, _id: &str) -> CatalogResult<Vehicle> {
        Err(CatalogError::Unsupported("get_vehicle"))
    }

    /// Makes across all years (autocomplete)
    async fn list_makes(&self) -> CatalogResult<Vec<Make>> {
        Err(CatalogError::Unsupported("list_makes"))
    }

    /// Models across all years, optionally restricted to one make (autocomplete)
    async fn list_models(&self, _make_id: Option<&str>) -> CatalogResult<Vec<ModelName>> {
        Err(CatalogError::Unsupported("list_models"))
    }

    /// Trims of a year that clear the minimum for a ranking stat
    async fn get_trims_by_stat(&self, _year: i32, _stat: RankStat) -> CatalogResult<Vec<Vehicle>> {
        Err(CatalogError::Unsupported("get_trims_by_stat"))
    }

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Minimum value a trim needs for a ranking stat, as `(attribute, minimum)`
pub fn stat_threshold(stat: RankStat) -> (&'static str, f64) {
    match stat {
        RankStat::Horsepower => ("model_engine_power_hp", 80.0),
        RankStat::Weight => ("model_weight_lbs", 1000.0),
    }
}
