//! HTTP API endpoints.
//!
//! Handlers are thin: they parse the request, call into the engine or the
//! shared state, and map typed errors onto status codes.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::CatalogError;
use crate::engine::ranking::{check_ranking, clamp_pool_size, correct_order, draw_pool, RankingPool};
use crate::engine::{select_daily_car, CatalogLevel, GameError, Seed, SeedError, SelectError};
use crate::state::{AppState, GameView, SessionError};
use crate::types::*;

/// Header carrying the opaque user key streaks are stored under
pub const USER_KEY_HEADER: &str = "x-user-key";

/// Autocomplete never returns more than this many suggestions
const MAX_SEARCH_RESULTS: usize = 10;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/autoguessr/random-car", get(random_car))
        .route("/api/autoguessr/car/{model_id}", get(get_car))
        .route("/api/autoguessr/search", get(search))
        .route("/api/autoguessr/games", post(create_game))
        .route("/api/autoguessr/games/{id}", get(get_game))
        .route("/api/autoguessr/games/{id}/guesses", post(submit_guess))
        .route("/api/autoguessr/games/{id}/forfeit", post(forfeit_game))
        .route("/api/stats", get(get_stats))
        .route("/api/stats/update", post(update_stats))
        .route("/api/autorank/pool", get(autorank_pool))
        .route("/api/autorank/check", post(autorank_check))
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    EmptyLevel(CatalogLevel),
    Conflict(String),
    Upstream(String),
    NotImplemented(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Unauthorized" }),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            ApiError::EmptyLevel(level) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error": format!("No {} found for the selected car", level),
                    "level": level,
                }),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!({ "error": msg })),
            ApiError::Upstream(msg) => {
                tracing::warn!("Catalog failure: {}", msg);
                (StatusCode::BAD_GATEWAY, serde_json::json!({ "error": msg }))
            }
            ApiError::NotImplemented(msg) => {
                (StatusCode::NOT_IMPLEMENTED, serde_json::json!({ "error": msg }))
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) => ApiError::NotFound(e.to_string()),
            CatalogError::Unsupported(_) => ApiError::NotImplemented(e.to_string()),
            CatalogError::Unavailable(_) | CatalogError::Timeout(_) | CatalogError::Parse(_) => {
                ApiError::Upstream(e.to_string())
            }
        }
    }
}

impl From<SelectError> for ApiError {
    fn from(e: SelectError) -> Self {
        match e {
            SelectError::CatalogUnavailable(inner) => inner.into(),
            SelectError::EmptyCatalogLevel(level) => ApiError::EmptyLevel(level),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => ApiError::NotFound(e.to_string()),
            SessionError::Game(GameError::InvalidGuess(inner)) => {
                ApiError::BadRequest(inner.to_string())
            }
            SessionError::Game(over @ GameError::GameOver(_)) => ApiError::Conflict(over.to_string()),
        }
    }
}

impl From<SeedError> for ApiError {
    fn from(e: SeedError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// User key from the request headers, if present and non-blank
fn user_key(headers: &HeaderMap) -> Option<UserKey> {
    headers
        .get(USER_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

/// JSON value accepted where clients send either `2000` or `"2000"`.
///
/// Anything else is kept as its JSON text so validation can reject it with
/// a typed error instead of a body rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
            Scalar::Other(value) => value.to_string(),
        }
    }
}

/// Text of an optional field; absent and `null` both become empty
fn field_text(value: Option<Scalar>) -> String {
    value.map(Scalar::into_text).unwrap_or_default()
}

fn seed_or_random(raw: Option<&str>) -> Result<Seed, SeedError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Seed::parse(raw),
        _ => Ok(Seed::new(rand::rng().random_range(0..=i32::MAX))),
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    pub seed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RandomCarResponse {
    pub model_id: VehicleId,
    pub make: MakeId,
    pub model: String,
    pub year: i32,
    pub seed: Seed,
}

/// Today's (or the given seed's) car.
///
/// GET /api/autoguessr/random-car?seed=N
pub async fn random_car(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
) -> ApiResult<RandomCarResponse> {
    let seed = Seed::from_param(query.seed.as_deref())?;
    let daily = select_daily_car(state.catalog.as_ref(), seed).await?;

    Ok(Json(RandomCarResponse {
        model_id: daily.vehicle.id,
        make: daily.vehicle.make_id,
        model: daily.vehicle.model,
        year: daily.vehicle.year,
        seed,
    }))
}

/// Full vehicle record.
///
/// GET /api/autoguessr/car/{model_id}
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<VehicleId>,
) -> ApiResult<Vehicle> {
    Ok(Json(state.catalog.get_vehicle(&model_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub query: Option<String>,
    pub make: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Case-insensitive substring filter; drops repeats, keeps first-seen order
fn filter_suggestions<'a>(names: impl Iterator<Item = &'a str>, query: &str) -> Vec<SearchResult> {
    let needle = query.to_lowercase();
    let mut results: Vec<SearchResult> = Vec::new();
    for name in names.filter(|name| name.to_lowercase().contains(&needle)) {
        if results.iter().any(|r| r.value == name) {
            continue;
        }
        results.push(SearchResult {
            value: name.to_string(),
            label: name.to_string(),
        });
        if results.len() == MAX_SEARCH_RESULTS {
            break;
        }
    }
    results
}

async fn search_makes(state: &AppState, query: &str) -> Result<Vec<SearchResult>, CatalogError> {
    let makes = state.catalog.list_makes().await?;
    Ok(filter_suggestions(
        makes.iter().map(|m| m.display_name.as_str()),
        query,
    ))
}

async fn search_models(
    state: &AppState,
    query: &str,
    make: Option<&str>,
) -> Result<Vec<SearchResult>, CatalogError> {
    // Clients send the make's display name; an unknown make searches all models
    let make_id = match make.filter(|m| !m.trim().is_empty()) {
        Some(display) => state
            .catalog
            .list_makes()
            .await?
            .into_iter()
            .find(|m| m.display_name.eq_ignore_ascii_case(display.trim()))
            .map(|m| m.id),
        None => None,
    };

    let models = state.catalog.list_models(make_id.as_deref()).await?;
    Ok(filter_suggestions(
        models.iter().map(|m| m.name.as_str()),
        query,
    ))
}

/// Autocomplete for makes and models. Never fails; errors yield no results.
///
/// GET /api/autoguessr/search?type=make|model&query=Q[&make=M]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let (Some(kind), Some(text)) = (query.kind.as_deref(), query.query.as_deref()) else {
        return Json(SearchResponse { results: vec![] });
    };
    if text.is_empty() {
        return Json(SearchResponse { results: vec![] });
    }

    let outcome = match kind {
        "make" => search_makes(&state, text).await,
        "model" => search_models(&state, text, query.make.as_deref()).await,
        _ => Ok(vec![]),
    };

    let results = outcome.unwrap_or_else(|e| {
        tracing::warn!("Search for {} '{}' failed: {}", kind, text, e);
        vec![]
    });
    Json(SearchResponse { results })
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub difficulty: Difficulty,
    pub seed: Option<Scalar>,
}

/// Start a game against the seed's car.
///
/// POST /api/autoguessr/games
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let raw_seed = req.seed.map(Scalar::into_text);
    let seed = Seed::from_param(raw_seed.as_deref())?;
    let (_, view) = state
        .create_game(req.difficulty, seed, user_key(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/autoguessr/games/{id}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<GameId>,
) -> ApiResult<GameView> {
    state
        .get_game(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Game not found: {}", id)))
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    #[serde(default)]
    pub make: Option<Scalar>,
    #[serde(default)]
    pub model: Option<Scalar>,
    #[serde(default)]
    pub year: Option<Scalar>,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    pub record: GuessRecord,
    pub game: GameView,
}

/// POST /api/autoguessr/games/{id}/guesses
pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(id): Path<GameId>,
    Json(req): Json<GuessRequest>,
) -> ApiResult<GuessResponse> {
    let guess = Guess {
        make: field_text(req.make),
        model: field_text(req.model),
        year: field_text(req.year),
    };
    let (record, game) = state.submit_guess(&id, &guess).await?;
    Ok(Json(GuessResponse { record, game }))
}

/// POST /api/autoguessr/games/{id}/forfeit
pub async fn forfeit_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<GameId>,
) -> ApiResult<GameView> {
    Ok(Json(state.forfeit_game(&id).await?))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub autoguessr_current_streak: u32,
    pub autoguessr_max_streak: u32,
    pub autorank_current_streak: u32,
    pub autorank_max_streak: u32,
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatsResponse> {
    let user = user_key(&headers).ok_or(ApiError::Unauthorized)?;
    let streaks = state.streaks.get_streaks(&user).await.map_err(|e| {
        tracing::error!("Failed to load streaks for {}: {}", user, e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(StatsResponse {
        autoguessr_current_streak: streaks.autoguessr.current,
        autoguessr_max_streak: streaks.autoguessr.max,
        autorank_current_streak: streaks.autorank.current,
        autorank_max_streak: streaks.autorank.max,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatsUpdateRequest {
    pub game: GameKind,
    pub won: bool,
}

/// Record a result reported by the client.
///
/// POST /api/stats/update
pub async fn update_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<StatsUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = user_key(&headers).ok_or(ApiError::Unauthorized)?;
    state
        .streaks
        .record_result(&user, req.game, req.won)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update streaks for {}: {}", user, e);
            ApiError::Internal(e.to_string())
        })?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct PoolQuery {
    #[serde(default)]
    pub stat: RankStat,
    pub count: Option<usize>,
    pub seed: Option<String>,
}

/// Ranking pool; a fresh random seed is drawn when none is given.
///
/// GET /api/autorank/pool?stat=horsepower|weight&count=N&seed=S
pub async fn autorank_pool(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PoolQuery>,
) -> ApiResult<RankingPool> {
    let seed = seed_or_random(query.seed.as_deref())?;
    let count = clamp_pool_size(query.count);
    let pool = draw_pool(state.catalog.as_ref(), query.stat, count, seed).await?;

    tracing::debug!(
        "Drew {} {:?} pool of {} for seed {}",
        pool.year,
        pool.stat,
        pool.vehicles.len(),
        seed
    );
    Ok(Json(pool))
}

#[derive(Debug, Deserialize)]
pub struct RankCheckRequest {
    pub seed: Scalar,
    #[serde(default)]
    pub stat: RankStat,
    pub count: Option<usize>,
    pub order: Vec<VehicleId>,
}

#[derive(Debug, Serialize)]
pub struct RankCheckResponse {
    pub correct: bool,
    pub correct_order: Vec<VehicleId>,
}

/// Check a submitted ordering against the replayed pool.
///
/// POST /api/autorank/check
pub async fn autorank_check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RankCheckRequest>,
) -> ApiResult<RankCheckResponse> {
    let seed = Seed::parse(&req.seed.into_text())?;
    let count = clamp_pool_size(req.count);
    let pool = draw_pool(state.catalog.as_ref(), req.stat, count, seed).await?;

    let correct = check_ranking(&pool.vehicles, pool.stat, &req.order);
    if let Some(user) = user_key(&headers) {
        state.record_outcome(&user, GameKind::Autorank, correct).await;
    }

    Ok(Json(RankCheckResponse {
        correct,
        correct_order: correct_order(&pool.vehicles, pool.stat),
    }))
}
