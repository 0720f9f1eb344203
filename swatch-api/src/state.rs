//! Application state for the swatch API.
//!
//! Holds the shared material store and the outbound HTTP client used by the
//! image proxy.

use std::sync::Arc;

use swatch::MaterialStore;

use crate::error::{ApiError, ApiResult};

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Store location (`sqlite://path`, bare path or `:memory:`)
    pub database_url: String,
    /// Origins allowed by CORS. Empty means `http://localhost:<port>`.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Sustained requests per second per client IP
    pub rate_limit_per_second: u32,
    /// Burst size per client IP
    pub rate_limit_burst: u32,
    /// Requests in flight at once, across all routes
    pub max_in_flight: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "swatch.db".to_string(),
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            rate_limit_per_second: 50,
            rate_limit_burst: 100,
            max_in_flight: 100,
        }
    }
}

impl ApiConfig {
    /// Origins CORS should accept, falling back to the local frontend.
    pub fn allowed_origins(&self) -> Vec<String> {
        if self.cors_origins.is_empty() {
            vec![format!("http://localhost:{}", self.port)]
        } else {
            self.cors_origins.clone()
        }
    }
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Material store, shared with blocking tasks
    pub store: Arc<MaterialStore>,
    /// Client for outbound image fetches
    pub http: reqwest::Client,
}

impl AppState {
    /// Create state around an already opened store.
    pub fn new(config: ApiConfig, store: MaterialStore) -> Self {
        Self {
            config,
            store: Arc::new(store),
            http: reqwest::Client::new(),
        }
    }

    /// Open the store named by `config.database_url` and build the state.
    pub fn open(config: ApiConfig) -> ApiResult<Self> {
        let store = MaterialStore::connect(&config.database_url)
            .map_err(|e| ApiError::Internal(format!("Failed to open store: {}", e)))?;
        Ok(Self::new(config, store))
    }

    /// Handle to the store for use inside `spawn_blocking`.
    pub fn store(&self) -> Arc<MaterialStore> {
        Arc::clone(&self.store)
    }
}
