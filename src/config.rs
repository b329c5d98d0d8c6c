use std::env;
use std::time::Duration;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::providers::openrouteservice::DEFAULT_BASE_URL;
use crate::store::demo::DEFAULT_POINT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    /// `sqlite://path` or a bare path; absent means an in-memory store.
    pub database_url: Option<String>,
    pub routing_api_key: Option<String>,
    pub routing_base_url: String,
    pub geocode_provider_url: Option<String>,
    pub seed_demo_data: bool,
    pub engine: EngineSettings,
}

/// Knobs the optimizer and the order handlers read on every request.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub default_vehicle_count: i64,
    pub provider_timeout: Duration,
    /// Used for depots when no hub exists and for orders that cannot be geocoded.
    pub default_point: GeoPoint,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_vehicle_count: 3,
            provider_timeout: Duration::from_millis(2000),
            default_point: DEFAULT_POINT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let default_point = checked_point(GeoPoint {
            lat: parse_or_default("DEFAULT_LAT", DEFAULT_POINT.lat)?,
            lng: parse_or_default("DEFAULT_LNG", DEFAULT_POINT.lng)?,
        })?;
        let log_format = parse_log_format(optional("LOG_FORMAT").as_deref())?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            database_url: optional("DATABASE_URL"),
            routing_api_key: optional("ROUTING_API_KEY"),
            routing_base_url: optional("ROUTING_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            geocode_provider_url: optional("GEOCODE_PROVIDER_URL"),
            seed_demo_data: parse_or_default("SEED_DEMO_DATA", true)?,
            engine: EngineSettings {
                default_vehicle_count: parse_or_default("DEFAULT_VEHICLE_COUNT", 3)?,
                provider_timeout: Duration::from_millis(parse_or_default(
                    "PROVIDER_TIMEOUT_MS",
                    2000,
                )?),
                default_point,
            },
        })
    }
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat, AppError> {
    match raw {
        None | Some("compact") => Ok(LogFormat::Compact),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(AppError::Internal(format!(
            "invalid LOG_FORMAT: {other}, expected compact/json"
        ))),
    }
}

fn checked_point(point: GeoPoint) -> Result<GeoPoint, AppError> {
    if !point.is_valid() {
        return Err(AppError::Internal(format!(
            "invalid DEFAULT_LAT/DEFAULT_LNG: {}, {}",
            point.lat, point.lng
        )));
    }
    Ok(point)
}

/// Unset and blank variables are both treated as absent.
fn optional(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, optional(key), default)
}

fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
