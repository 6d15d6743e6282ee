use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cooldown::CooldownStatus;
use crate::error::{ceil_secs, PlaceError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub success: bool,
    pub cooldown_end: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownResponse {
    pub ready: bool,
    /// Whole seconds left, rounded up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_time: Option<i64>,
}

impl From<CooldownStatus> for CooldownResponse {
    fn from(status: CooldownStatus) -> Self {
        match status {
            CooldownStatus::Ready => Self {
                ready: true,
                remaining_time: None,
            },
            CooldownStatus::Waiting { remaining_ms } => Self {
                ready: false,
                remaining_time: Some(ceil_secs(remaining_ms)),
            },
        }
    }
}

impl IntoResponse for PlaceError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            PlaceError::InvalidInput(_) | PlaceError::OutOfBounds { .. } => {
                (StatusCode::BAD_REQUEST, simple(self.to_string()))
            }
            PlaceError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, simple("Not authenticated".into()))
            }
            PlaceError::CooldownActive { remaining_ms } => {
                let secs = self.retry_after_secs().unwrap_or_default();
                let body = ErrorBody {
                    error: format!("wait {} seconds", secs),
                    remaining_ms: Some(*remaining_ms),
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                return response;
            }
            PlaceError::Storage(e) => {
                tracing::error!("Storage fault: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, internal())
            }
            PlaceError::Render(e) => {
                tracing::error!("Failed to render canvas: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, internal())
            }
        };

        (status, Json(body)).into_response()
    }
}

fn simple(error: String) -> ErrorBody {
    ErrorBody {
        error,
        remaining_ms: None,
    }
}

fn internal() -> ErrorBody {
    simple("Internal server error, please retry".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (PlaceError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                PlaceError::OutOfBounds { x: 50, y: 0, size: 50 },
                StatusCode::BAD_REQUEST,
            ),
            (PlaceError::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (
                PlaceError::CooldownActive { remaining_ms: 11_000 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                PlaceError::Storage(StoreError::Poisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_cooldown_sets_retry_after() {
        let response = PlaceError::CooldownActive { remaining_ms: 10_500 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "11");
    }

    #[test]
    fn test_cooldown_body_matches_retry_after() {
        let err = PlaceError::CooldownActive { remaining_ms: 4_001 };
        let secs = err.retry_after_secs().unwrap();
        assert_eq!(secs, 5);

        let response = err.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], secs.to_string().as_str());
    }

    #[test]
    fn test_cooldown_response_shape() {
        let ready = serde_json::to_value(CooldownResponse::from(CooldownStatus::Ready)).unwrap();
        assert_eq!(ready, serde_json::json!({"ready": true}));

        let waiting = serde_json::to_value(CooldownResponse::from(CooldownStatus::Waiting {
            remaining_ms: 4_200,
        }))
        .unwrap();
        assert_eq!(waiting, serde_json::json!({"ready": false, "remainingTime": 5}));
    }
}
