use std::env;

use crate::engine::fare::FareSchedule;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub fares: FareSchedule,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 5000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            fares: FareSchedule {
                base_fare: parse_or_default("BASE_FARE", 50.0)?,
                per_km_rate: parse_or_default("PER_KM_RATE", 10.0)?,
                per_min_rate: parse_or_default("PER_MINUTE_RATE", 2.0)?,
                default_surge: parse_or_default("SURGE_MULTIPLIER", 1.0)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
