use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use wayfarer_core::Sentiment;

use crate::{
    IntentProvider, IntentSignal, ProviderError, SentimentProvider, SentimentSignal,
};

#[derive(Debug, Deserialize)]
struct IntentResponse {
    #[serde(alias = "name", alias = "intentName")]
    intent: String,
    #[serde(default, alias = "score", alias = "confidenceScore")]
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    #[serde(alias = "label")]
    sentiment: String,
    #[serde(default, alias = "confidence")]
    score: Option<f32>,
}

/// Intent detection over a JSON endpoint:
/// `POST {endpoint}` with `{"text", "sessionId"}`, answering `{"intent", "confidence"}`.
#[derive(Debug, Clone)]
pub struct HttpIntentProvider {
    name: String,
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpIntentProvider {
    pub fn new(name: &str, client: Client, endpoint: Url, api_key: String) -> Self {
        Self {
            name: name.to_string(),
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl IntentProvider for HttpIntentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect_intent(
        &self,
        message: &str,
        session_id: &str,
    ) -> Result<IntentSignal, ProviderError> {
        let body = serde_json::json!({
            "text": message,
            "sessionId": session_id,
        });
        let parsed: IntentResponse =
            post_json(&self.client, &self.name, &self.endpoint, &self.api_key, &body).await?;

        let intent = parsed.intent.trim().to_lowercase();
        if intent.is_empty() {
            return Err(ProviderError::Decode {
                provider: self.name.clone(),
                reason: "empty intent".to_string(),
            });
        }

        Ok(IntentSignal {
            intent,
            confidence: parsed.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        })
    }
}

/// Sentiment analysis over a JSON endpoint:
/// `POST {endpoint}` with `{"text"}`, answering `{"sentiment", "score"}`.
#[derive(Debug, Clone)]
pub struct HttpSentimentProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpSentimentProvider {
    pub fn new(client: Client, endpoint: Url, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl SentimentProvider for HttpSentimentProvider {
    fn name(&self) -> &str {
        "sentiment"
    }

    async fn analyze(&self, message: &str) -> Result<SentimentSignal, ProviderError> {
        let body = serde_json::json!({ "text": message });
        let parsed: SentimentResponse =
            post_json(&self.client, self.name(), &self.endpoint, &self.api_key, &body).await?;

        let label = Sentiment::parse(&parsed.sentiment).ok_or_else(|| ProviderError::Decode {
            provider: self.name().to_string(),
            reason: format!("unknown sentiment label '{}'", parsed.sentiment),
        })?;

        Ok(SentimentSignal {
            label,
            score: parsed.score.unwrap_or(0.5).clamp(0.0, 1.0),
        })
    }
}

async fn post_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    endpoint: &Url,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<T, ProviderError> {
    let response = client
        .post(endpoint.clone())
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|source| ProviderError::Http {
            provider: provider.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(|error| ProviderError::Decode {
        provider: provider.to_string(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_response_accepts_aliases() {
        let parsed: IntentResponse =
            serde_json::from_str(r#"{"intentName":"plan_trip","score":0.91}"#).unwrap();
        assert_eq!(parsed.intent, "plan_trip");
        assert_eq!(parsed.confidence, Some(0.91));

        let bare: IntentResponse = serde_json::from_str(r#"{"intent":"general"}"#).unwrap();
        assert_eq!(bare.confidence, None);
    }

    #[test]
    fn sentiment_response_accepts_label_alias() {
        let parsed: SentimentResponse =
            serde_json::from_str(r#"{"label":"POSITIVE","confidence":0.8}"#).unwrap();
        assert_eq!(Sentiment::parse(&parsed.sentiment), Some(Sentiment::Positive));
        assert_eq!(parsed.score, Some(0.8));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let provider = HttpIntentProvider::new(
            "primary-intent",
            Client::new(),
            Url::parse("http://127.0.0.1:9/detect").unwrap(),
            "key".to_string(),
        );
        let error = provider.detect_intent("hi", "s-1").await.unwrap_err();
        assert!(matches!(error, ProviderError::Http { .. }));
    }
}
