use std::env;
use std::net::SocketAddr;

use border0_core::{build_router, PolicyDeps, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(border0_core::logging::tracing_filter())
        .init();

    let config = config_from_env();
    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY not set; /rainorshine will answer 400");
    }
    tracing::debug!(?config, "policy server configuration");

    let deps = PolicyDeps::live(&config)?;
    let bind = config.bind;
    let app = build_router(config, deps);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(addr = %bind, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn config_from_env() -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        bind: parse_socket("POLICY_BIND", defaults.bind),
        api_secret: env::var("API_SECRET").unwrap_or(defaults.api_secret),
        weather_api_key: parse_optional_string("WEATHER_API_KEY"),
        geo_base_url: env::var("GEO_API_URL").unwrap_or(defaults.geo_base_url),
        weather_base_url: env::var("WEATHER_API_URL").unwrap_or(defaults.weather_base_url),
        geo_max_attempts: parse_u32("GEO_MAX_ATTEMPTS", defaults.geo_max_attempts),
        enforce_business_hours: parse_bool(
            "ENFORCE_BUSINESS_HOURS",
            defaults.enforce_business_hours,
        ),
        upstream_timeout: defaults.upstream_timeout,
    }
}

fn parse_socket(key: &str, default: SocketAddr) -> SocketAddr {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_optional_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"),
        Err(_) => default,
    }
}

fn parse_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(v) => v.parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}
