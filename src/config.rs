//! Application configuration loaded from environment variables.

use crate::services::plans::DEFAULT_STALE_PLAN_DAYS;
use std::env;

/// Which [`NutritionStore`](crate::db::NutritionStore) backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Firestore,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Allowed CORS origin for the app shell
    pub frontend_url: String,
    pub store_backend: StoreBackend,
    /// GCP project ID, required for the Firestore backend
    pub gcp_project_id: Option<String>,

    /// Gemini API key; analysis is mocked without one
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Force the deterministic analysis mock
    pub mock_food_analysis: bool,

    /// Age in days at which a plan is recalculated
    pub stale_plan_days: i64,
}

impl Config {
    /// Config for tests: in-memory store and mocked analysis.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:8081".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: None,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            mock_food_analysis: true,
            stale_plan_days: DEFAULT_STALE_PLAN_DAYS,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("firestore") => StoreBackend::Firestore,
            Some(other) => {
                return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string()));
            }
        };

        let gcp_project_id = var("GCP_PROJECT_ID");
        if store_backend == StoreBackend::Firestore && gcp_project_id.is_none() {
            return Err(ConfigError::Missing("GCP_PROJECT_ID"));
        }

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            None => 8080,
        };

        let stale_plan_days = match var("STALE_PLAN_DAYS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => return Err(ConfigError::Invalid("STALE_PLAN_DAYS", raw)),
            },
            None => DEFAULT_STALE_PLAN_DAYS,
        };

        let mock_food_analysis = match var("MOCK_FOOD_ANALYSIS").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::Invalid("MOCK_FOOD_ANALYSIS", other.to_string()));
            }
        };

        Ok(Self {
            port,
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:8081".to_string()),
            store_backend,
            gcp_project_id,
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            mock_food_analysis,
            stale_plan_days,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
