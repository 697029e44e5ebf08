use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_API_SECRET: &str = "superSecret";
pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_WEATHER_URL: &str = "https://api.weatherapi.com/v1";

/// Policy webhook server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:5000).
    pub bind: SocketAddr,
    /// Value the `Authorization` header must match exactly.
    pub api_secret: String,
    /// weatherapi.com key; `/rainorshine` answers 400 without one.
    pub weather_api_key: Option<String>,
    pub geo_base_url: String,
    pub weather_base_url: String,
    /// Attempts per geolocation lookup before giving up.
    pub geo_max_attempts: u32,
    /// Deny `/businesshours` outside Monday–Friday 09:00–17:59 local time.
    pub enforce_business_hours: bool,
    /// Timeout for each upstream HTTP call.
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000),
            api_secret: DEFAULT_API_SECRET.to_string(),
            weather_api_key: None,
            geo_base_url: DEFAULT_GEO_URL.to_string(),
            weather_base_url: DEFAULT_WEATHER_URL.to_string(),
            geo_max_attempts: 7,
            enforce_business_hours: false,
            upstream_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("api_secret", &"<redacted>")
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "<redacted>"))
            .field("geo_base_url", &self.geo_base_url)
            .field("weather_base_url", &self.weather_base_url)
            .field("geo_max_attempts", &self.geo_max_attempts)
            .field("enforce_business_hours", &self.enforce_business_hours)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}
