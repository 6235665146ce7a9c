use std::sync::Arc;

use async_trait::async_trait;
use rand::{rng, RngExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;
use wayfarer_core::WeatherReport;

use crate::settings::WeatherSettings;
use crate::{ProviderError, WeatherProvider};

const SYNTHETIC_CONDITIONS: &[&str] = &[
    "sunny",
    "partly cloudy",
    "cloudy",
    "light rain",
    "clear skies",
    "windy",
];

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: Option<u16>,
}

/// Geocode the destination, then read current conditions for the coordinates.
#[derive(Debug, Clone)]
pub struct OpenMeteoWeather {
    client: Client,
    geocode_url: Url,
    forecast_url: Url,
}

impl OpenMeteoWeather {
    pub fn new(client: Client, geocode_url: Url, forecast_url: Url) -> Self {
        Self {
            client,
            geocode_url,
            forecast_url,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    fn name(&self) -> &str {
        "open-meteo"
    }

    async fn current(&self, destination: &str) -> Result<Option<WeatherReport>, ProviderError> {
        let mut geocode_url = self.geocode_url.clone();
        geocode_url
            .query_pairs_mut()
            .append_pair("name", destination)
            .append_pair("count", "1");
        let geocode: GeocodeResponse = get_json(&self.client, self.name(), geocode_url).await?;

        let Some(hit) = geocode.results.first() else {
            return Ok(None);
        };

        let mut forecast_url = self.forecast_url.clone();
        forecast_url
            .query_pairs_mut()
            .append_pair("latitude", &hit.latitude.to_string())
            .append_pair("longitude", &hit.longitude.to_string())
            .append_pair(
                "current",
                "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code",
            );
        let forecast: ForecastResponse = get_json(&self.client, self.name(), forecast_url).await?;

        Ok(forecast.current.map(|current| WeatherReport {
            temperature_c: current.temperature_2m,
            condition: current
                .weather_code
                .map(describe_weather_code)
                .unwrap_or("unknown conditions")
                .to_string(),
            humidity: current.relative_humidity_2m.map(clamp_humidity),
            wind_kph: current.wind_speed_10m,
            source: Some(self.name().to_string()),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct SecondaryResponse {
    main: SecondaryMain,
    #[serde(default)]
    weather: Vec<SecondaryDescription>,
    wind: Option<SecondaryWind>,
}

#[derive(Debug, Deserialize)]
struct SecondaryMain {
    temp: f64,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SecondaryDescription {
    description: String,
}

#[derive(Debug, Deserialize)]
struct SecondaryWind {
    speed: f64,
}

/// City-name weather lookup with an API key, metric units, wind in m/s.
#[derive(Debug, Clone)]
pub struct SecondaryWeather {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl SecondaryWeather {
    pub fn new(client: Client, endpoint: Url, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for SecondaryWeather {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn current(&self, destination: &str) -> Result<Option<WeatherReport>, ProviderError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", destination)
            .append_pair("appid", &self.api_key)
            .append_pair("units", "metric");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                provider: self.name().to_string(),
                source,
            })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: self.name().to_string(),
                status: response.status().as_u16(),
            });
        }
        let parsed: SecondaryResponse =
            response.json().await.map_err(|error| ProviderError::Decode {
                provider: self.name().to_string(),
                reason: error.to_string(),
            })?;

        Ok(Some(WeatherReport {
            temperature_c: parsed.main.temp,
            condition: parsed
                .weather
                .first()
                .map(|item| item.description.clone())
                .unwrap_or_else(|| "unknown conditions".to_string()),
            humidity: parsed.main.humidity.map(clamp_humidity),
            wind_kph: parsed.wind.map(|wind| wind.speed * 3.6),
            source: Some(self.name().to_string()),
        }))
    }
}

/// Live provider, then the secondary provider, then a synthetic reading.
#[derive(Clone)]
pub struct WeatherChain {
    primary: Option<Arc<dyn WeatherProvider>>,
    secondary: Option<Arc<dyn WeatherProvider>>,
}

impl WeatherChain {
    pub fn new(
        primary: Option<Arc<dyn WeatherProvider>>,
        secondary: Option<Arc<dyn WeatherProvider>>,
    ) -> Self {
        Self { primary, secondary }
    }

    pub fn synthetic_only() -> Self {
        Self::new(None, None)
    }

    pub fn from_settings(settings: &WeatherSettings, client: Client) -> Self {
        let primary = settings.enabled.then(|| {
            Arc::new(OpenMeteoWeather::new(
                client.clone(),
                settings.geocode_url.clone(),
                settings.forecast_url.clone(),
            )) as Arc<dyn WeatherProvider>
        });
        let secondary = settings.secondary_key.clone().map(|api_key| {
            Arc::new(SecondaryWeather::new(
                client,
                settings.secondary_url.clone(),
                api_key,
            )) as Arc<dyn WeatherProvider>
        });
        Self::new(primary, secondary)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Always produces a reading. Synthetic readings have no `source`.
    pub async fn lookup(&self, destination: &str) -> WeatherReport {
        for provider in [&self.primary, &self.secondary].into_iter().flatten() {
            match provider.current(destination).await {
                Ok(Some(report)) => return report,
                Ok(None) => debug!(provider = provider.name(), destination, "no weather result"),
                Err(error) => debug!(provider = provider.name(), %error, "weather lookup failed"),
            }
        }
        synthetic_weather()
    }
}

pub fn synthetic_weather() -> WeatherReport {
    let mut rng = rng();
    let temperature: u32 = rng.random_range(5..=30);
    let condition = SYNTHETIC_CONDITIONS[rng.random_range(0..SYNTHETIC_CONDITIONS.len())];
    let humidity: u8 = rng.random_range(30..=90);
    let wind: u32 = rng.random_range(0..=30);

    WeatherReport {
        temperature_c: f64::from(temperature),
        condition: condition.to_string(),
        humidity: Some(humidity),
        wind_kph: Some(f64::from(wind)),
        source: None,
    }
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: Url,
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ProviderError::Http {
            provider: provider.to_string(),
            source,
        })?;
    if !response.status().is_success() {
        return Err(ProviderError::Status {
            provider: provider.to_string(),
            status: response.status().as_u16(),
        });
    }
    response.json::<T>().await.map_err(|error| ProviderError::Decode {
        provider: provider.to_string(),
        reason: error.to_string(),
    })
}

fn clamp_humidity(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// WMO weather interpretation codes.
fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "clear sky",
        1 | 2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 | 56 | 57 => "drizzle",
        61 | 63 | 65 | 66 | 67 => "rain",
        71 | 73 | 75 | 77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95..=99 => "thunderstorm",
        _ => "unknown conditions",
    }
}
