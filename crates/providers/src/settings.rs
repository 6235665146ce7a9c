use std::env;
use std::time::Duration;

use url::Url;

const DEFAULT_GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const DEFAULT_SECONDARY_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// Live when credentials are present, mock otherwise.
    Auto,
    Live,
    Mock,
    Off,
}

impl ProviderMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" => Some(Self::Auto),
            "live" => Some(Self::Live),
            "mock" => Some(Self::Mock),
            "off" | "disabled" | "none" => Some(Self::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlotSettings {
    pub mode: ProviderMode,
    pub endpoint: Option<Url>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub enabled: bool,
    pub geocode_url: Url,
    pub forecast_url: Url,
    pub secondary_url: Url,
    pub secondary_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub primary: SlotSettings,
    pub secondary: SlotSettings,
    pub sentiment: SlotSettings,
    pub weather: WeatherSettings,
}

impl ProviderSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from any variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let primary = slot(&lookup, "PRIMARY_INTENT", "PRIMARY", 5_000)?;
        let secondary = slot(&lookup, "SECONDARY_DIALOG", "SECONDARY", 5_000)?;
        let sentiment = slot(&lookup, "SENTIMENT", "SENTIMENT", 3_000)?;

        let enabled = match non_empty(&lookup, "WAYFARER_WEATHER_ENABLED") {
            Some(value) => parse_bool("WAYFARER_WEATHER_ENABLED", &value)?,
            None => true,
        };

        let weather = WeatherSettings {
            enabled,
            geocode_url: url_or_default(&lookup, "WAYFARER_GEOCODE_URL", DEFAULT_GEOCODE_URL)?,
            forecast_url: url_or_default(&lookup, "WAYFARER_FORECAST_URL", DEFAULT_FORECAST_URL)?,
            secondary_url: url_or_default(
                &lookup,
                "WAYFARER_SECONDARY_WEATHER_URL",
                DEFAULT_SECONDARY_WEATHER_URL,
            )?,
            secondary_key: non_empty(&lookup, "WAYFARER_SECONDARY_WEATHER_KEY"),
        };

        Ok(Self {
            primary,
            secondary,
            sentiment,
            weather,
        })
    }
}

fn slot<F>(
    lookup: &F,
    prefix: &str,
    timeout_prefix: &str,
    default_timeout_ms: u64,
) -> Result<SlotSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mode_var = format!("WAYFARER_{}_MODE", prefix);
    let mode = match non_empty(lookup, &mode_var) {
        Some(value) => ProviderMode::parse(&value).ok_or_else(|| {
            ConfigError::InvalidValue(mode_var.clone(), format!("unknown mode '{}'", value))
        })?,
        None => ProviderMode::Auto,
    };

    let url_var = format!("WAYFARER_{}_URL", prefix);
    let endpoint = non_empty(lookup, &url_var)
        .map(|value| parse_url(&url_var, &value))
        .transpose()?;

    let timeout_var = format!("WAYFARER_{}_TIMEOUT_MS", timeout_prefix);
    let timeout_ms = match non_empty(lookup, &timeout_var) {
        Some(value) => value.parse::<u64>().map_err(|error| {
            ConfigError::InvalidValue(timeout_var.clone(), error.to_string())
        })?,
        None => default_timeout_ms,
    };

    Ok(SlotSettings {
        mode,
        endpoint,
        api_key: non_empty(lookup, &format!("WAYFARER_{}_KEY", prefix)),
        timeout: Duration::from_millis(timeout_ms),
    })
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn url_or_default<F>(lookup: &F, name: &str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = non_empty(lookup, name).unwrap_or_else(|| default.to_string());
    parse_url(name, &value)
}

fn parse_url(name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|error| ConfigError::InvalidValue(name.to_string(), error.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("unsupported scheme '{}'", other),
        )),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("expected a boolean, got '{}'", other),
        )),
    }
}
