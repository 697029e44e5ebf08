//! Custom authorization rules Border0 calls as HTTP webhooks.

mod error;
mod geo;
mod request;
pub(crate) mod rules;
mod weather;

pub use error::{PolicyError, WEATHER_KEY_HINT};
pub use geo::{GeoError, GeoInfo, GeoLocator, LiveGeoLocator};
pub use rules::{
    weekday_index, within_business_hours, Clock, Decision, RandomScore, ScoreSource, SystemClock,
    FRIDAY, MAX_SCORE, MIN_SCORE,
};
pub use weather::{is_rain, LiveWeatherProvider, WeatherError, WeatherProvider};
