use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("invalid geolocation URL: {0}")]
    InvalidUrl(String),

    #[error("geolocation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geolocation service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("geolocation lookup failed: {0}")]
    Lookup(String),

    #[error("geolocation response has no {0}")]
    MissingField(&'static str),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
}

impl GeoError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status(_))
    }
}

/// Subset of the ip-api.com response used by the policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl GeoInfo {
    pub fn time_zone(&self) -> Result<Tz, GeoError> {
        let name = self
            .timezone
            .as_deref()
            .filter(|tz| !tz.is_empty())
            .ok_or(GeoError::MissingField("timezone"))?;
        name.parse::<Tz>()
            .map_err(|_| GeoError::UnknownTimezone(name.to_string()))
    }

    /// `<city>,<countryCode>`, the query form the weather API expects.
    pub fn location(&self) -> Result<String, GeoError> {
        let city = self.city.as_deref().ok_or(GeoError::MissingField("city"))?;
        let country = self
            .country_code
            .as_deref()
            .ok_or(GeoError::MissingField("countryCode"))?;
        Ok(format!("{city},{country}"))
    }
}

/// Object-safe IP geolocation lookup.
pub trait GeoLocator: Send + Sync + 'static {
    fn locate<'a>(
        &'a self,
        ip: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<GeoInfo, GeoError>> + Send + 'a>>;
}

/// ip-api.com client with retries and a process-wide cache of successful lookups.
pub struct LiveGeoLocator {
    http: reqwest::Client,
    base_url: Url,
    max_attempts: u32,
    cache: Mutex<HashMap<String, GeoInfo>>,
}

impl LiveGeoLocator {
    pub fn new(base_url: &str, max_attempts: u32, timeout: Duration) -> Result<Self, GeoError> {
        let base_url = Url::parse(base_url).map_err(|e| GeoError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(GeoError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            max_attempts: max_attempts.max(1),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn cached(&self, ip: &str) -> Option<GeoInfo> {
        self.cache.lock().ok()?.get(ip).cloned()
    }

    async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoError> {
        if let Some(hit) = self.cached(ip) {
            return Ok(hit);
        }

        let mut attempt = 1;
        let info = loop {
            match self.fetch(ip).await {
                Ok(info) => break info,
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::debug!(%ip, attempt, error = %e, "geolocation attempt failed");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        if info.status == "fail" {
            let reason = info.message.unwrap_or_else(|| "unknown reason".to_string());
            return Err(GeoError::Lookup(reason));
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(ip.to_string(), info.clone());
        }
        Ok(info)
    }

    async fn fetch(&self, ip: &str) -> Result<GeoInfo, GeoError> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ip);
        }
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(GeoError::Status(resp.status()));
        }
        Ok(resp.json::<GeoInfo>().await?)
    }
}

impl GeoLocator for LiveGeoLocator {
    fn locate<'a>(
        &'a self,
        ip: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<GeoInfo, GeoError>> + Send + 'a>> {
        Box::pin(self.lookup(ip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn locator(server: &MockServer) -> LiveGeoLocator {
        LiveGeoLocator::new(&format!("{}/json", server.uri()), 3, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn parses_timezone_and_location() {
        let info: GeoInfo = serde_json::from_str(
            r#"{"status":"success","timezone":"Europe/Amsterdam","city":"Amsterdam","countryCode":"NL"}"#,
        )
        .unwrap();
        assert_eq!(info.time_zone().unwrap(), chrono_tz::Europe::Amsterdam);
        assert_eq!(info.location().unwrap(), "Amsterdam,NL");
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        let info = GeoInfo {
            timezone: Some("Mars/Olympus".into()),
            ..GeoInfo::default()
        };
        assert!(matches!(info.time_zone(), Err(GeoError::UnknownTimezone(_))));
    }

    #[tokio::test]
    async fn successful_lookups_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/198.51.100.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "timezone": "America/New_York",
                "city": "New York",
                "countryCode": "US"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geo = locator(&server);
        let first = geo.locate("198.51.100.7").await.unwrap();
        let second = geo.locate("198.51.100.7").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(geo.cached_len(), 1);
    }

    #[tokio::test]
    async fn fail_status_is_not_cached_or_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/10.0.0.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let geo = locator(&server);
        for _ in 0..2 {
            let err = geo.locate("10.0.0.1").await.unwrap_err();
            assert_eq!(err.to_string(), "geolocation lookup failed: private range");
        }
        assert_eq!(geo.cached_len(), 0);
    }

    #[tokio::test]
    async fn transient_errors_retry_up_to_the_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let geo = locator(&server);
        let err = geo.locate("192.0.2.1").await.unwrap_err();
        assert!(err.is_transient());
    }
}
