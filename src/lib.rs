pub mod api;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod placement;
pub mod store;

use axum::http::HeaderName;
use std::sync::Arc;

use canvas::Color;
use clock::{Clock, SystemClock};
use config::{ConfigError, PlaceConfig, StorageBackend};
use error::ServerError;
use placement::PlacementCoordinator;
use store::{DocumentStore, MemoryStore, SqliteStore};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<PlacementCoordinator>,
    pub clock: Arc<dyn Clock>,
    pub identity_header: HeaderName,
}

impl AppState {
    pub fn new(
        coordinator: PlacementCoordinator,
        clock: Arc<dyn Clock>,
        identity_header: HeaderName,
    ) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            clock,
            identity_header,
        }
    }

    /// Wire the configured backing store into a coordinator running on the wall clock
    pub fn from_config(config: &PlaceConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let store: Arc<dyn DocumentStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Sqlite => Arc::new(SqliteStore::new(&config.storage.path)?),
        };

        Self::with_store(config, store, Arc::new(SystemClock))
    }

    pub fn with_store(
        config: &PlaceConfig,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServerError> {
        let invalid = |reason: String| ServerError::Config(ConfigError::Validation(reason));

        let default_color =
            Color::parse(&config.canvas.default_color).map_err(|e| invalid(e.to_string()))?;
        let identity_header = HeaderName::from_bytes(config.server.identity_header.as_bytes())
            .map_err(|e| invalid(e.to_string()))?;

        let coordinator = PlacementCoordinator::with_store(
            store,
            config.canvas.size,
            default_color,
            config.cooldown.interval_ms,
        );

        Ok(Self::new(coordinator, clock, identity_header))
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
