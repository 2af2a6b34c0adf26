use super::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// CarQuery-compatible HTTP catalog
pub struct CarQueryProvider {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    sold_in_us: bool,
}

impl CarQueryProvider {
    pub fn new(base_url: String, timeout: Duration, sold_in_us: bool) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            timeout,
            sold_in_us,
        })
    }

    /// Issue one `cmd` request and decode its JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        cmd: &str,
        params: &[(&str, String)],
    ) -> CatalogResult<T> {
        let mut query: Vec<(&str, String)> = vec![("cmd", cmd.to_string())];
        query.extend(params.iter().cloned());
        if self.sold_in_us {
            query.push(("sold_in_us", "1".to_string()));
        }

        tracing::debug!("CarQuery {} {:?}", cmd, params);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.get(&self.base_url).query(&query).send(),
        )
        .await
        .map_err(|_| CatalogError::Timeout(self.timeout))?
        .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Unavailable(format!(
                "CarQuery {} returned status: {}",
                cmd,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct YearsEnvelope {
    #[serde(rename = "Years")]
    years: YearsRecord,
}

#[derive(Debug, Deserialize)]
struct YearsRecord {
    min_year: Value,
    max_year: Value,
}

#[derive(Debug, Deserialize)]
struct MakesEnvelope {
    #[serde(rename = "Makes", default)]
    makes: Vec<MakeRecord>,
}

#[derive(Debug, Deserialize)]
struct MakeRecord {
    make_id: String,
    make_display: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsEnvelope {
    #[serde(rename = "Models", default)]
    models: Vec<ModelRecord>,
}

#[derive(Debug, Deserialize)]
struct ModelRecord {
    model_name: String,
}

#[derive(Debug, Deserialize)]
struct TrimsEnvelope {
    #[serde(rename = "Trims", default)]
    trims: Vec<TrimRecord>,
}

/// One trim as CarQuery sends it: a flat object of mostly-string fields
#[derive(Debug, Deserialize)]
struct TrimRecord {
    model_id: Value,
    model_make_id: String,
    model_name: String,
    model_year: Value,
    #[serde(flatten)]
    rest: BTreeMap<String, Value>,
}

/// CarQuery mixes strings, numbers and nulls for the same field
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_year(value: &Value, field: &str) -> CatalogResult<i32> {
    scalar_to_string(value)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| CatalogError::Parse(format!("{} is not a year: {}", field, value)))
}

impl TryFrom<TrimRecord> for Vehicle {
    type Error = CatalogError;

    fn try_from(record: TrimRecord) -> CatalogResult<Self> {
        let id = scalar_to_string(&record.model_id)
            .ok_or_else(|| CatalogError::Parse("trim without model_id".to_string()))?;
        let year = parse_year(&record.model_year, "model_year")?;

        let attributes = record
            .rest
            .iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
            .collect();

        Ok(Vehicle {
            id,
            make_id: record.model_make_id,
            model: record.model_name,
            year,
            attributes,
        })
    }
}

fn into_vehicles(trims: Vec<TrimRecord>) -> CatalogResult<Vec<Vehicle>> {
    trims.into_iter().map(Vehicle::try_from).collect()
}

fn into_makes(records: Vec<MakeRecord>) -> Vec<Make> {
    records
        .into_iter()
        .map(|m| Make {
            display_name: m.make_display.unwrap_or_else(|| m.make_id.clone()),
            id: m.make_id,
        })
        .collect()
}

#[async_trait]
impl CatalogProvider for CarQueryProvider {
    async fn get_year_range(&self) -> CatalogResult<YearRange> {
        let envelope: YearsEnvelope = self.fetch("getYears", &[]).await?;
        Ok(YearRange {
            min: parse_year(&envelope.years.min_year, "min_year")?,
            max: parse_year(&envelope.years.max_year, "max_year")?,
        })
    }

    async fn get_makes(&self, year: i32) -> CatalogResult<Vec<Make>> {
        let envelope: MakesEnvelope = self
            .fetch("getMakes", &[("year", year.to_string())])
            .await?;
        Ok(into_makes(envelope.makes))
    }

    async fn get_models(&self, make_id: &str, year: i32) -> CatalogResult<Vec<ModelName>> {
        let envelope: ModelsEnvelope = self
            .fetch(
                "getModels",
                &[("make", make_id.to_string()), ("year", year.to_string())],
            )
            .await?;
        Ok(envelope
            .models
            .into_iter()
            .map(|m| ModelName { name: m.model_name })
            .collect())
    }

    async fn get_trims(
        &self,
        make_id: &str,
        model: &str,
        year: i32,
    ) -> CatalogResult<Vec<Vehicle>> {
        let envelope: TrimsEnvelope = self
            .fetch(
                "getTrims",
                &[
                    ("make", make_id.to_string()),
                    ("model", model.to_string()),
                    ("year", year.to_string()),
                ],
            )
            .await?;
        into_vehicles(envelope.trims)
    }

    async fn get_vehicle(&self, id: &str) -> CatalogResult<Vehicle> {
        // getModel answers with a bare array rather than an envelope
        let records: Vec<TrimRecord> = self.fetch("getModel", &[("model", id.to_string())]).await?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(format!("vehicle {}", id)))
            .and_then(Vehicle::try_from)
    }

    async fn list_makes(&self) -> CatalogResult<Vec<Make>> {
        let envelope: MakesEnvelope = self.fetch("getMakes", &[]).await?;
        Ok(into_makes(envelope.makes))
    }

    async fn list_models(&self, make_id: Option<&str>) -> CatalogResult<Vec<ModelName>> {
        let params: Vec<(&str, String)> = make_id
            .map(|id| vec![("make", id.to_string())])
            .unwrap_or_default();
        let envelope: ModelsEnvelope = self.fetch("getModels", &params).await?;
        Ok(envelope
            .models
            .into_iter()
            .map(|m| ModelName { name: m.model_name })
            .collect())
    }

    async fn get_trims_by_stat(&self, year: i32, stat: RankStat) -> CatalogResult<Vec<Vehicle>> {
        let filter = match stat {
            RankStat::Horsepower => ("min_power", "80".to_string()),
            RankStat::Weight => ("min_weight", "1000".to_string()),
        };
        let envelope: TrimsEnvelope = self
            .fetch("getTrims", &[("year", year.to_string()), filter])
            .await?;
        into_vehicles(envelope.trims)
    }

    fn name(&self) -> &str {
        "carquery"
    }
}
