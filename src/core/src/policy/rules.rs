use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde_json::{json, Value};

use super::request::PolicyRequest;
use super::weather::is_rain;
use super::PolicyError;
use crate::server::AppState;

pub const FRIDAY: u32 = 4;
pub const MIN_SCORE: u8 = 60;
pub const MAX_SCORE: u8 = 100;

/// Status plus JSON body returned to Border0.
pub type Decision = (StatusCode, Json<Value>);

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of `/random` confidence scores.
pub trait ScoreSource: Send + Sync + 'static {
    fn score(&self) -> u8;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomScore;

impl ScoreSource for RandomScore {
    fn score(&self) -> u8 {
        rand::thread_rng().gen_range(MIN_SCORE..=MAX_SCORE)
    }
}

/// Day of week with Monday = 0.
pub fn weekday_index(at: &DateTime<Tz>) -> u32 {
    at.weekday().num_days_from_monday()
}

/// Monday–Friday, 09:00 through 17:59.
pub fn within_business_hours(day: u32, hour: u32) -> bool {
    day < 5 && (9..=17).contains(&hour)
}

async fn local_now(state: &AppState, ip: &str) -> Result<DateTime<Tz>, PolicyError> {
    let info = state.geo.locate(ip).await?;
    let tz = info.time_zone()?;
    Ok(state.clock.now().with_timezone(&tz))
}

/// POST /fridayrule: deny on Fridays in the caller's timezone.
pub(crate) async fn friday_rule(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Decision, PolicyError> {
    let req = PolicyRequest::parse(&body)?;
    let ip = req.require("ip")?;

    let current_day = weekday_index(&local_now(&state, ip).await?);
    tracing::info!(%ip, current_day, "friday rule evaluated");

    let status = if current_day == FRIDAY {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "current_day": current_day }))))
}

/// POST /random: deny HTTP sockets, otherwise hand out a confidence score.
pub(crate) async fn random_score(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Decision, PolicyError> {
    let req = PolicyRequest::parse(&body)?;
    let ip = req.require("ip")?;
    let user = req.require("user")?;
    let protocol = req.require("protocol")?;

    if protocol == "http" {
        tracing::info!(%ip, %user, "http socket denied");
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "confidence_score": 0 })),
        ));
    }

    let score = state.scores.score();
    tracing::info!(%ip, %user, %protocol, score, "confidence score issued");
    Ok((StatusCode::OK, Json(json!({ "confidence_score": score }))))
}

/// POST /rainorshine: report whether it is raining where the caller is.
pub(crate) async fn rain_or_shine(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Decision, PolicyError> {
    let req = PolicyRequest::parse(&body)?;
    let ip = req.require("ip")?;

    let location = state.geo.locate(ip).await?.location()?;
    let api_key = state
        .config
        .weather_api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(PolicyError::WeatherKeyMissing)?;

    let condition = state.weather.current_condition(api_key, &location).await?;
    let is_raining = is_rain(&condition);
    tracing::info!(%ip, %location, %condition, is_raining, "weather checked");
    Ok((StatusCode::OK, Json(json!({ "is_raining": is_raining }))))
}

/// POST /businesshours: report the caller's local hour and weekday, denying
/// outside business hours when enforcement is on.
pub(crate) async fn business_hours(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Decision, PolicyError> {
    let req = PolicyRequest::parse(&body)?;
    let ip = req.require("ip")?;

    let now = local_now(&state, ip).await?;
    let hour_of_day = now.hour();
    let current_day = weekday_index(&now);
    tracing::info!(%ip, hour_of_day, current_day, "business hours evaluated");

    if state.config.enforce_business_hours && !within_business_hours(current_day, hour_of_day) {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "hour_of_day": hour_of_day,
                "current_day": current_day,
                "error": "denied not in business hours",
            })),
        ));
    }
    Ok((
        StatusCode::OK,
        Json(json!({ "hour_of_day": hour_of_day, "current_day": current_day })),
    ))
}
