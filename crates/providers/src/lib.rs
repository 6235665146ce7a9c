mod fallback;
mod http;
mod settings;
mod weather;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;
use wayfarer_core::{Sentiment, WeatherReport};

pub use fallback::{
    default_dialog_intent, heuristic_intent, lexicon_sentiment, mock_dialog_intent,
    DEFAULT_DIALOG_INTENT,
};
pub use http::{HttpIntentProvider, HttpSentimentProvider};
pub use settings::{ConfigError, ProviderMode, ProviderSettings, SlotSettings, WeatherSettings};
pub use weather::{synthetic_weather, OpenMeteoWeather, SecondaryWeather, WeatherChain};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Http {
        provider: String,
        source: reqwest::Error,
    },
    #[error("{provider} returned status {status}")]
    Status { provider: String, status: u16 },
    #[error("{provider} response could not be decoded: {reason}")]
    Decode { provider: String, reason: String },
    #[error("{0} is not configured")]
    NotConfigured(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentSignal {
    pub intent: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentSignal {
    pub label: Sentiment,
    pub score: f32,
}

#[async_trait]
pub trait IntentProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn detect_intent(
        &self,
        message: &str,
        session_id: &str,
    ) -> Result<IntentSignal, ProviderError>;
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, message: &str) -> Result<SentimentSignal, ProviderError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;
    /// `Ok(None)` when the provider has no reading for the destination.
    async fn current(&self, destination: &str) -> Result<Option<WeatherReport>, ProviderError>;
}

/// How a provider slot is wired. Chosen once at startup.
pub enum Capability<P: ?Sized> {
    Live(Arc<P>),
    Mock,
    Unavailable,
}

impl<P: ?Sized> Capability<P> {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Live(_) => CapabilityKind::Live,
            Self::Mock => CapabilityKind::Mock,
            Self::Unavailable => CapabilityKind::Unavailable,
        }
    }
}

impl<P: ?Sized> Clone for Capability<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Live(provider) => Self::Live(Arc::clone(provider)),
            Self::Mock => Self::Mock,
            Self::Unavailable => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Live,
    Mock,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderTimeouts {
    pub primary: Duration,
    pub secondary: Duration,
    pub sentiment: Duration,
}

impl Default for ProviderTimeouts {
    fn default() -> Self {
        Self {
            primary: Duration::from_millis(5_000),
            secondary: Duration::from_millis(5_000),
            sentiment: Duration::from_millis(3_000),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderCapabilities {
    pub primary_intent: CapabilityKind,
    pub secondary_dialog: CapabilityKind,
    pub sentiment: CapabilityKind,
    pub live_weather: bool,
    pub secondary_weather: bool,
}

#[derive(Clone)]
pub struct ProviderRegistry {
    pub primary: Capability<dyn IntentProvider>,
    pub secondary: Capability<dyn IntentProvider>,
    pub sentiment: Capability<dyn SentimentProvider>,
    pub timeouts: ProviderTimeouts,
    pub weather: WeatherChain,
}

impl ProviderRegistry {
    /// Every slot mocked and no live weather; never touches the network.
    pub fn offline() -> Self {
        Self {
            primary: Capability::Mock,
            secondary: Capability::Mock,
            sentiment: Capability::Mock,
            timeouts: ProviderTimeouts::default(),
            weather: WeatherChain::synthetic_only(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings, client: reqwest::Client) -> Self {
        let primary = match settings.primary.resolve("primary intent provider") {
            Some((endpoint, api_key)) => Capability::Live(Arc::new(HttpIntentProvider::new(
                "primary-intent",
                client.clone(),
                endpoint,
                api_key,
            )) as Arc<dyn IntentProvider>),
            None => settings.primary.fallback_capability(),
        };

        let secondary = match settings.secondary.resolve("secondary dialog provider") {
            Some((endpoint, api_key)) => Capability::Live(Arc::new(HttpIntentProvider::new(
                "secondary-dialog",
                client.clone(),
                endpoint,
                api_key,
            )) as Arc<dyn IntentProvider>),
            None => settings.secondary.fallback_capability(),
        };

        let sentiment = match settings.sentiment.resolve("sentiment provider") {
            Some((endpoint, api_key)) => Capability::Live(Arc::new(HttpSentimentProvider::new(
                client.clone(),
                endpoint,
                api_key,
            )) as Arc<dyn SentimentProvider>),
            None => settings.sentiment.fallback_capability(),
        };

        Self {
            primary,
            secondary,
            sentiment,
            timeouts: ProviderTimeouts {
                primary: settings.primary.timeout,
                secondary: settings.secondary.timeout,
                sentiment: settings.sentiment.timeout,
            },
            weather: WeatherChain::from_settings(&settings.weather, client),
        }
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            primary_intent: self.primary.kind(),
            secondary_dialog: self.secondary.kind(),
            sentiment: self.sentiment.kind(),
            live_weather: self.weather.has_primary(),
            secondary_weather: self.weather.has_secondary(),
        }
    }
}

impl SlotSettings {
    fn resolve(&self, label: &str) -> Option<(url::Url, String)> {
        match self.mode {
            ProviderMode::Off | ProviderMode::Mock => None,
            ProviderMode::Auto | ProviderMode::Live => {
                match (self.endpoint.clone(), self.api_key.clone()) {
                    (Some(endpoint), Some(api_key)) => Some((endpoint, api_key)),
                    _ => {
                        if self.mode == ProviderMode::Live {
                            warn!(provider = label, "live mode requested without credentials; using mock");
                        }
                        None
                    }
                }
            }
        }
    }

    fn fallback_capability<P: ?Sized>(&self) -> Capability<P> {
        match self.mode {
            ProviderMode::Off => Capability::Unavailable,
            _ => Capability::Mock,
        }
    }
}

pub fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(3))
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_select_mock() {
        let settings = ProviderSettings::from_lookup(|_| None).unwrap();
        let registry = ProviderRegistry::from_settings(&settings, reqwest::Client::new());
        let caps = registry.capabilities();
        assert_eq!(caps.primary_intent, CapabilityKind::Mock);
        assert_eq!(caps.secondary_dialog, CapabilityKind::Mock);
        assert_eq!(caps.sentiment, CapabilityKind::Mock);
        assert!(!caps.secondary_weather);
    }

    #[test]
    fn credentials_select_live_and_off_wins() {
        let settings = ProviderSettings::from_lookup(|name| match name {
            "WAYFARER_PRIMARY_INTENT_URL" => Some("https://nlu.example.com/detect".to_string()),
            "WAYFARER_PRIMARY_INTENT_KEY" => Some("secret".to_string()),
            "WAYFARER_SENTIMENT_URL" => Some("https://nlu.example.com/sentiment".to_string()),
            "WAYFARER_SENTIMENT_KEY" => Some("secret".to_string()),
            "WAYFARER_SENTIMENT_MODE" => Some("off".to_string()),
            "WAYFARER_WEATHER_ENABLED" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();
        let registry = ProviderRegistry::from_settings(&settings, reqwest::Client::new());
        let caps = registry.capabilities();
        assert_eq!(caps.primary_intent, CapabilityKind::Live);
        assert_eq!(caps.secondary_dialog, CapabilityKind::Mock);
        assert_eq!(caps.sentiment, CapabilityKind::Unavailable);
        assert!(!caps.live_weather);
    }

    #[test]
    fn offline_registry_has_default_timeouts() {
        let registry = ProviderRegistry::offline();
        assert_eq!(registry.timeouts.primary, Duration::from_millis(5_000));
        assert_eq!(registry.timeouts.sentiment, Duration::from_millis(3_000));
        assert!(!registry.capabilities().live_weather);
    }
}
