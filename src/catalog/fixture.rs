//! In-memory catalog backed by a fixed vehicle list.
//!
//! Used for offline play (`CATALOG_FIXTURE`) and as the stub provider in tests.

use super::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk shape of a catalog fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFixture {
    /// Reported year range; derived from the vehicles when absent
    #[serde(default)]
    pub years: Option<YearRange>,
    /// Make display names, in catalog order
    #[serde(default)]
    pub makes: Vec<Make>,
    pub vehicles: Vec<Vehicle>,
}

pub struct StaticCatalog {
    years: Option<YearRange>,
    makes: Vec<Make>,
    vehicles: Vec<Vehicle>,
}

impl StaticCatalog {
    pub fn new(fixture: CatalogFixture) -> Self {
        let years = fixture.years.or_else(|| {
            let min = fixture.vehicles.iter().map(|v| v.year).min()?;
            let max = fixture.vehicles.iter().map(|v| v.year).max()?;
            Some(YearRange { min, max })
        });

        // Every make referenced by a vehicle needs an entry, even without a display name
        let mut makes = fixture.makes;
        for vehicle in &fixture.vehicles {
            if !makes.iter().any(|m| m.id == vehicle.make_id) {
                makes.push(Make {
                    id: vehicle.make_id.clone(),
                    display_name: vehicle.make_id.clone(),
                });
            }
        }

        Self {
            years,
            makes,
            vehicles: fixture.vehicles,
        }
    }

    pub fn from_vehicles(vehicles: Vec<Vehicle>) -> Self {
        Self::new(CatalogFixture {
            vehicles,
            ..Default::default()
        })
    }

    /// Load a fixture from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Unavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let fixture: CatalogFixture =
            serde_json::from_str(&raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self::new(fixture))
    }

    fn makes_matching(&self, keep: impl Fn(&Make) -> bool) -> Vec<Make> {
        self.makes.iter().filter(|m| keep(m)).cloned().collect()
    }

    /// Distinct model names in first-seen order
    fn model_names<'a>(vehicles: impl Iterator<Item = &'a Vehicle>) -> Vec<ModelName> {
        let mut names: Vec<ModelName> = Vec::new();
        for vehicle in vehicles {
            if !names.iter().any(|n| n.name == vehicle.model) {
                names.push(ModelName {
                    name: vehicle.model.clone(),
                });
            }
        }
        names
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn get_year_range(&self) -> CatalogResult<YearRange> {
        Ok(self.years.unwrap_or(YearRange::EMPTY))
    }

    async fn get_makes(&self, year: i32) -> CatalogResult<Vec<Make>> {
        Ok(self.makes_matching(|make| {
            self.vehicles
                .iter()
                .any(|v| v.year == year && v.make_id == make.id)
        }))
    }

    async fn get_models(&self, make_id: &str, year: i32) -> CatalogResult<Vec<ModelName>> {
        Ok(Self::model_names(
            self.vehicles
                .iter()
                .filter(|v| v.year == year && v.make_id == make_id),
        ))
    }

    async fn get_trims(
        &self,
        make_id: &str,
        model: &str,
        year: i32,
    ) -> CatalogResult<Vec<Vehicle>> {
        Ok(self
            .vehicles
            .iter()
            .filter(|v| v.year == year && v.make_id == make_id && v.model == model)
            .cloned()
            .collect())
    }

    async fn get_vehicle(&self, id: &str) -> CatalogResult<Vehicle> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("vehicle {}", id)))
    }

    async fn list_makes(&self) -> CatalogResult<Vec<Make>> {
        Ok(self.makes.clone())
    }

    async fn list_models(&self, make_id: Option<&str>) -> CatalogResult<Vec<ModelName>> {
        Ok(Self::model_names(
            self.vehicles
                .iter()
                .filter(|v| make_id.is_none_or(|id| v.make_id == id)),
        ))
    }

    async fn get_trims_by_stat(&self, year: i32, stat: RankStat) -> CatalogResult<Vec<Vehicle>> {
        let (attribute, minimum) = stat_threshold(stat);
        Ok(self
            .vehicles
            .iter()
            .filter(|v| v.year == year)
            .filter(|v| {
                v.attribute(attribute)
                    .and_then(|raw| raw.trim().parse::<f64>().ok())
                    .is_some_and(|value| value >= minimum)
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}
