use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::geo::GeoError;
use super::weather::WeatherError;

pub const WEATHER_KEY_HINT: &str =
    "WEATHER_API_KEY not set, create one here https://www.weatherapi.com/my/";

/// Failures a policy endpoint reports back to the caller as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Invalid Authorization key")]
    Unauthorized,

    #[error("missing or non-string field '{0}'")]
    MissingField(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", WEATHER_KEY_HINT)]
    WeatherKeyMissing,

    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error(transparent)]
    Weather(#[from] WeatherError),
}

impl IntoResponse for PolicyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => {
                tracing::error!(error = %self, "policy evaluation failed");
                StatusCode::BAD_REQUEST
            }
        };
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_401() {
        let resp = PolicyError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_failures_are_400() {
        let resp = PolicyError::from(GeoError::Lookup("private range".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = PolicyError::WeatherKeyMissing.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
