use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoguessr::catalog::{CarQueryProvider, CatalogProvider, StaticCatalog};
use autoguessr::config::AppConfig;
use autoguessr::state::{spawn_session_pruner, AppState};
use autoguessr::streaks::{JsonFileStreakStore, MemoryStreakStore, StreakStore};
use autoguessr::api;

/// Game sessions older than this are dropped
const SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 3600);

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoguessr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Autoguessr...");

    let config = AppConfig::from_env();

    let catalog: Arc<dyn CatalogProvider> = match &config.catalog_fixture {
        Some(path) => {
            let catalog = StaticCatalog::from_json_file(path)
                .expect("Failed to load catalog fixture");
            tracing::info!("Serving catalog from fixture {}", path.display());
            Arc::new(catalog)
        }
        None => {
            let catalog = CarQueryProvider::new(
                config.catalog_base_url.clone(),
                config.catalog_timeout,
                config.catalog_sold_in_us,
            )
            .expect("Failed to build catalog client");
            tracing::info!(
                "Using catalog at {} (timeout {:?}, US only: {})",
                config.catalog_base_url,
                config.catalog_timeout,
                config.catalog_sold_in_us
            );
            Arc::new(catalog)
        }
    };

    let streaks: Arc<dyn StreakStore> = match &config.streak_store_path {
        Some(path) => Arc::new(
            JsonFileStreakStore::open(path)
                .await
                .expect("Failed to open streak store"),
        ),
        None => {
            tracing::warn!("STREAK_STORE_PATH not set, streaks will not survive a restart");
            Arc::new(MemoryStreakStore::new())
        }
    };

    let state = Arc::new(AppState::new(catalog, streaks));

    // Spawn background task for dropping abandoned game sessions
    spawn_session_pruner(state.clone(), SESSION_MAX_AGE);

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
