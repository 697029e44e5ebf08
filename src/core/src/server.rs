use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::require_shared_secret;
use crate::config::ServerConfig;
use crate::policy::rules;
use crate::policy::{
    Clock, GeoLocator, LiveGeoLocator, LiveWeatherProvider, RandomScore, ScoreSource, SystemClock,
    WeatherProvider,
};

/// Shared state accessible by handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub config: Arc<ServerConfig>,
    pub geo: Arc<dyn GeoLocator>,
    pub weather: Arc<dyn WeatherProvider>,
    pub clock: Arc<dyn Clock>,
    pub scores: Arc<dyn ScoreSource>,
}

/// External collaborators of the policy handlers.
#[derive(Clone)]
pub struct PolicyDeps {
    pub geo: Arc<dyn GeoLocator>,
    pub weather: Arc<dyn WeatherProvider>,
    pub clock: Arc<dyn Clock>,
    pub scores: Arc<dyn ScoreSource>,
}

impl PolicyDeps {
    /// HTTP-backed geolocation and weather, wall clock, random scores.
    pub fn live(config: &ServerConfig) -> Result<Self, String> {
        let geo = LiveGeoLocator::new(
            &config.geo_base_url,
            config.geo_max_attempts,
            config.upstream_timeout,
        )
        .map_err(|e| e.to_string())?;
        let weather = LiveWeatherProvider::new(&config.weather_base_url, config.upstream_timeout)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            geo: Arc::new(geo),
            weather: Arc::new(weather),
            clock: Arc::new(SystemClock),
            scores: Arc::new(RandomScore),
        })
    }
}

/// Build the axum router for the policy webhook server.
///
/// Policy routes require the shared secret; `/health` does not. Callers should
/// use `into_make_service_with_connect_info::<SocketAddr>()` so rejected
/// attempts are logged with the peer address.
pub fn build_router(config: ServerConfig, deps: PolicyDeps) -> Router {
    let state = AppState {
        config: Arc::new(config),
        geo: deps.geo,
        weather: deps.weather,
        clock: deps.clock,
        scores: deps.scores,
    };

    let policies = Router::new()
        .route("/fridayrule", post(rules::friday_rule))
        .route("/random", post(rules::random_score))
        .route("/rainorshine", post(rules::rain_or_shine))
        .route("/businesshours", post(rules::business_hours))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_shared_secret,
        ));

    Router::new()
        .merge(policies)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
