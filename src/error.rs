use thiserror::Error;

/// Faults raised by a backing document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Storage lock poisoned")]
    Poisoned,

    #[error("Corrupt document {collection}/{key}: {reason}")]
    Corrupt {
        collection: String,
        key: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pixel ({x}, {y}) is outside the {size}x{size} canvas")]
    OutOfBounds { x: i64, y: i64, size: usize },

    #[error("Cooldown active for another {remaining_ms} ms")]
    CooldownActive { remaining_ms: i64 },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Storage fault: {0}")]
    Storage(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] image::ImageError),
}

/// Failures that stop the server from starting or serving
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaceError {
    /// Whether repeating the same request unchanged can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlaceError::CooldownActive { .. } | PlaceError::Storage(_)
        )
    }

    /// Whole seconds until a blocked identity may place again, rounded up
    pub fn retry_after_secs(&self) -> Option<i64> {
        match self {
            PlaceError::CooldownActive { remaining_ms } => Some(ceil_secs(*remaining_ms)),
            _ => None,
        }
    }
}

pub(crate) fn ceil_secs(ms: i64) -> i64 {
    if ms <= 0 {
        0
    } else {
        (ms + 999) / 1000
    }
}
