use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Retention window for conversation log entries.
pub const CONVERSATION_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    PlanTrip,
    CheckWeather,
    FindFlights,
    CreateItinerary,
    General,
}

impl IntentType {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::PlanTrip => "plan_trip",
            Self::CheckWeather => "check_weather",
            Self::FindFlights => "find_flights",
            Self::CreateItinerary => "create_itinerary",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Day,
    Week,
    Month,
}

impl DurationUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().trim_end_matches('s') {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn days(self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
        }
    }
}

/// Best-effort entities pulled out of free text. `None` means unknown, not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Trip length normalised to days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Unit the duration was written in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_unit: Option<DurationUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,
}

impl EntityBag {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: IntentType,
    pub entities: EntityBag,
}

impl Intent {
    pub fn new(kind: IntentType, entities: EntityBag) -> Self {
        Self { kind, entities }
    }

    pub fn general() -> Self {
        Self::new(IntentType::General, EntityBag::default())
    }
}

/// Soft per-session memory of the follow-up the bot last offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub suggested_action: IntentType,
    pub entities: EntityBag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "bot" => Some(Self::Bot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub session_id: String,
    /// Epoch milliseconds; together with `session_id` forms the key.
    pub timestamp: i64,
    pub message: String,
    pub sender: Sender,
    /// Epoch seconds after which the store stops returning the turn.
    pub expires_at: i64,
}

impl ConversationTurn {
    pub fn new(session_id: &str, message: &str, sender: Sender, at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.to_string(),
            timestamp: at.timestamp_millis(),
            message: message.to_string(),
            sender,
            expires_at: (at + Duration::days(CONVERSATION_RETENTION_DAYS)).timestamp(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "positive" | "pos" => Some(Self::Positive),
            "negative" | "neg" => Some(Self::Negative),
            "neutral" | "mixed" => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderOrigin {
    PrimaryIntentProvider,
    SecondaryDialogProvider,
    SentimentProvider,
}

impl ProviderOrigin {
    pub fn label(self) -> &'static str {
        match self {
            Self::PrimaryIntentProvider => "Primary intent",
            Self::SecondaryDialogProvider => "Secondary dialog",
            Self::SentimentProvider => "Sentiment",
        }
    }
}

/// Where a provider slot's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Live,
    Mock,
    Unavailable,
    ErrorFallback,
    TimeoutFallback,
}

impl ResultSource {
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
            Self::Unavailable => "fallback:unconfigured",
            Self::ErrorFallback => "fallback:error",
            Self::TimeoutFallback => "fallback:timeout",
        }
    }

    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderPayload {
    Intent { name: String, confidence: f32 },
    Sentiment { label: Sentiment, score: f32 },
}

impl ProviderPayload {
    pub fn summary_value(&self) -> String {
        match self {
            Self::Intent { name, confidence } => format!("{} ({:.2})", name, confidence),
            Self::Sentiment { label, score } => format!("{} ({:.2})", label.as_code(), score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub origin: ProviderOrigin,
    pub payload: ProviderPayload,
    pub source: ResultSource,
}

/// One result per provider slot; never fewer than three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub primary: ProviderResult,
    pub secondary: ProviderResult,
    pub sentiment: ProviderResult,
}

impl AggregatedResult {
    pub fn results(&self) -> [&ProviderResult; 3] {
        [&self.primary, &self.secondary, &self.sentiment]
    }

    /// Sentiment label reported by the sentiment slot, if it carries one.
    pub fn sentiment_label(&self) -> Option<Sentiment> {
        match &self.sentiment.payload {
            ProviderPayload::Sentiment { label, .. } => Some(*label),
            ProviderPayload::Intent { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub condition: String,
    pub humidity: Option<u8>,
    pub wind_kph: Option<f64>,
    /// Provider that produced the reading. Synthetic readings carry `None`.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub timestamp: i64,
}
