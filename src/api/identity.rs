use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::PlaceError;
use crate::AppState;

/// Caller identity, as vouched for by the authentication proxy in front of us
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = PlaceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| Identity(name.to_string()))
            .ok_or(PlaceError::NotAuthenticated)
    }
}
