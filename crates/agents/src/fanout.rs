use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;
use wayfarer_core::{AggregatedResult, ProviderOrigin, ProviderPayload, ProviderResult, ResultSource};
use wayfarer_observability::AppMetrics;
use wayfarer_providers::{
    default_dialog_intent, heuristic_intent, lexicon_sentiment, mock_dialog_intent, Capability,
    IntentSignal, ProviderError, ProviderRegistry, SentimentSignal,
};

enum CallOutcome<T> {
    Answered(T),
    Failed(ProviderError),
    TimedOut,
}

/// Single attempt bounded by `limit`. A late answer is dropped with the future.
async fn bounded_call<T, F>(limit: Duration, call: F) -> CallOutcome<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match timeout(limit, call).await {
        Ok(Ok(value)) => CallOutcome::Answered(value),
        Ok(Err(error)) => CallOutcome::Failed(error),
        Err(_) => CallOutcome::TimedOut,
    }
}

/// Queries the three provider slots concurrently and always yields one
/// result per slot.
#[derive(Clone)]
pub struct ProviderFanOut {
    registry: ProviderRegistry,
    metrics: Arc<AppMetrics>,
}

impl ProviderFanOut {
    pub fn new(registry: ProviderRegistry, metrics: Arc<AppMetrics>) -> Self {
        Self { registry, metrics }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn aggregate(&self, message: &str, session_id: &str) -> AggregatedResult {
        let (primary, secondary, sentiment) = tokio::join!(
            self.primary_slot(message, session_id),
            self.secondary_slot(message, session_id),
            self.sentiment_slot(message),
        );

        AggregatedResult {
            primary: intent_result(ProviderOrigin::PrimaryIntentProvider, primary),
            secondary: intent_result(ProviderOrigin::SecondaryDialogProvider, secondary),
            sentiment: sentiment_result(sentiment),
        }
    }

    async fn primary_slot(&self, message: &str, session_id: &str) -> (IntentSignal, ResultSource) {
        let provider = match &self.registry.primary {
            Capability::Live(provider) => provider,
            Capability::Mock => return (heuristic_intent(message), ResultSource::Mock),
            Capability::Unavailable => return (heuristic_intent(message), ResultSource::Unavailable),
        };

        let outcome = bounded_call(
            self.registry.timeouts.primary,
            provider.detect_intent(message, session_id),
        )
        .await;
        self.settle("primary_intent", outcome, || heuristic_intent(message))
    }

    async fn secondary_slot(&self, message: &str, session_id: &str) -> (IntentSignal, ResultSource) {
        let provider = match &self.registry.secondary {
            Capability::Live(provider) => provider,
            Capability::Mock => return (mock_dialog_intent(message), ResultSource::Mock),
            Capability::Unavailable => return (default_dialog_intent(), ResultSource::Unavailable),
        };

        let outcome = bounded_call(
            self.registry.timeouts.secondary,
            provider.detect_intent(message, session_id),
        )
        .await;
        self.settle("secondary_dialog", outcome, default_dialog_intent)
    }

    async fn sentiment_slot(&self, message: &str) -> (SentimentSignal, ResultSource) {
        let provider = match &self.registry.sentiment {
            Capability::Live(provider) => provider,
            Capability::Mock => return (lexicon_sentiment(message), ResultSource::Mock),
            Capability::Unavailable => return (lexicon_sentiment(message), ResultSource::Unavailable),
        };

        let outcome = bounded_call(self.registry.timeouts.sentiment, provider.analyze(message)).await;
        self.settle("sentiment", outcome, || lexicon_sentiment(message))
    }

    fn settle<T>(
        &self,
        slot: &'static str,
        outcome: CallOutcome<T>,
        fallback: impl FnOnce() -> T,
    ) -> (T, ResultSource) {
        match outcome {
            CallOutcome::Answered(value) => (value, ResultSource::Live),
            CallOutcome::Failed(error) => {
                warn!(provider = slot, %error, "provider failed; using fallback");
                self.metrics.inc_provider_fallback(slot);
                (fallback(), ResultSource::ErrorFallback)
            }
            CallOutcome::TimedOut => {
                warn!(provider = slot, "provider timed out; using fallback");
                self.metrics.inc_provider_timeout(slot);
                (fallback(), ResultSource::TimeoutFallback)
            }
        }
    }
}

fn intent_result(origin: ProviderOrigin, (signal, source): (IntentSignal, ResultSource)) -> ProviderResult {
    ProviderResult {
        origin,
        payload: ProviderPayload::Intent {
            name: signal.intent,
            confidence: signal.confidence,
        },
        source,
    }
}

fn sentiment_result((signal, source): (SentimentSignal, ResultSource)) -> ProviderResult {
    ProviderResult {
        origin: ProviderOrigin::SentimentProvider,
        payload: ProviderPayload::Sentiment {
            label: signal.label,
            score: signal.score,
        },
        source,
    }
}
