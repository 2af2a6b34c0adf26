use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://www.carqueryapi.com/api/0.3/";

/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// CarQuery-compatible catalog endpoint
    pub catalog_base_url: String,
    /// Timeout for a single catalog request
    pub catalog_timeout: Duration,
    /// Restrict the catalog to vehicles sold in the US
    pub catalog_sold_in_us: bool,
    /// Serve from a JSON fixture instead of the HTTP catalog
    pub catalog_fixture: Option<PathBuf>,
    /// Persist streaks to this JSON file (in-memory when unset)
    pub streak_store_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            catalog_base_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_timeout: Duration::from_secs(10),
            catalog_sold_in_us: true,
            catalog_fixture: None,
            streak_store_path: None,
        }
    }
}

/// Non-blank, trimmed value of an environment variable
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Parse an env var, warning and falling back to the default on bad input
fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_value(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let catalog_sold_in_us = match env_value("CATALOG_SOLD_IN_US") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid CATALOG_SOLD_IN_US={:?}", raw);
                defaults.catalog_sold_in_us
            }),
            None => defaults.catalog_sold_in_us,
        };

        Self {
            bind_addr: env_parsed("BIND_ADDR", defaults.bind_addr),
            catalog_base_url: env_value("CATALOG_BASE_URL").unwrap_or(defaults.catalog_base_url),
            catalog_timeout: Duration::from_secs(env_parsed(
                "CATALOG_TIMEOUT",
                defaults.catalog_timeout.as_secs(),
            )),
            catalog_sold_in_us,
            catalog_fixture: env_value("CATALOG_FIXTURE").map(PathBuf::from),
            streak_store_path: env_value("STREAK_STORE_PATH").map(PathBuf::from),
        }
    }
}
