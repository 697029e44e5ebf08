use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("invalid weather URL: {0}")]
    InvalidUrl(String),

    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather service error: {0}")]
    Api(String),

    #[error("weather response has no current condition")]
    MissingCondition,
}

/// Object-safe current-conditions lookup.
pub trait WeatherProvider: Send + Sync + 'static {
    /// Condition text for `location` (e.g. "Patchy light rain").
    fn current_condition<'a>(
        &'a self,
        api_key: &'a str,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, WeatherError>> + Send + 'a>>;
}

/// weatherapi.com client.
pub struct LiveWeatherProvider {
    http: reqwest::Client,
    base_url: Url,
}

impl LiveWeatherProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let base_url =
            Url::parse(base_url).map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(WeatherError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    async fn fetch(&self, api_key: &str, location: &str) -> Result<String, WeatherError> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("current.json");
        }
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .append_pair("q", location);

        let body: Value = self.http.get(url).send().await?.json().await?;
        condition_text(&body)
    }
}

impl WeatherProvider for LiveWeatherProvider {
    fn current_condition<'a>(
        &'a self,
        api_key: &'a str,
        location: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, WeatherError>> + Send + 'a>> {
        Box::pin(self.fetch(api_key, location))
    }
}

fn condition_text(body: &Value) -> Result<String, WeatherError> {
    if let Some(text) = body.pointer("/current/condition/text").and_then(Value::as_str) {
        return Ok(text.to_string());
    }
    match body.pointer("/error/message").and_then(Value::as_str) {
        Some(message) => Err(WeatherError::Api(message.to_string())),
        None => Err(WeatherError::MissingCondition),
    }
}

/// Whether a condition text describes rain, in any casing.
pub fn is_rain(condition: &str) -> bool {
    condition.to_lowercase().contains("rain")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rain_detection_ignores_case() {
        assert!(is_rain("Patchy Light RAIN"));
        assert!(is_rain("Moderate rain at times"));
        assert!(!is_rain("Sunny"));
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let err = condition_text(&json!({"error": {"code": 2006, "message": "API key is invalid."}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "weather service error: API key is invalid.");
        assert!(matches!(
            condition_text(&json!({})),
            Err(WeatherError::MissingCondition)
        ));
    }

    #[tokio::test]
    async fn queries_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "wk"))
            .and(query_param("q", "Amsterdam,NL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"condition": {"text": "Light rain shower"}}
            })))
            .mount(&server)
            .await;

        let provider =
            LiveWeatherProvider::new(&format!("{}/v1", server.uri()), Duration::from_secs(5))
                .unwrap();
        let text = provider
            .current_condition("wk", "Amsterdam,NL")
            .await
            .unwrap();
        assert_eq!(text, "Light rain shower");
    }
}
