mod composer;
mod fanout;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{info, instrument, warn};
use wayfarer_core::{
    classify_follow_up, extract_intent, ChatReply, ConversationTurn, Sender, ValidatedChat,
};
use wayfarer_observability::AppMetrics;
use wayfarer_providers::{ProviderCapabilities, ProviderRegistry};
use wayfarer_storage::{ConversationLog, SessionContexts, TurnClock};

pub use composer::{Composition, ResponseComposer};
pub use fanout::ProviderFanOut;

/// The chat pipeline: extract, fan out to providers, compose, record.
#[derive(Clone)]
pub struct TravelAgent<S>
where
    S: ConversationLog,
{
    fan_out: ProviderFanOut,
    composer: ResponseComposer,
    contexts: SessionContexts,
    clock: TurnClock,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> TravelAgent<S>
where
    S: ConversationLog,
{
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<S>,
        contexts: SessionContexts,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        let composer = ResponseComposer::new(registry.weather.clone(), metrics.clone());
        Self {
            fan_out: ProviderFanOut::new(registry, metrics.clone()),
            composer,
            contexts,
            clock: TurnClock::new(),
            store,
            metrics,
        }
    }

    pub fn capabilities(&self) -> ProviderCapabilities {
        self.fan_out.registry().capabilities()
    }

    pub fn contexts(&self) -> &SessionContexts {
        &self.contexts
    }

    #[instrument(skip(self, chat), fields(session_id = %chat.session_id))]
    pub async fn handle_chat(&self, chat: ValidatedChat) -> Result<ChatReply> {
        let started = Instant::now();
        self.metrics.inc_request();

        let ValidatedChat {
            message,
            session_id,
        } = chat;
        let received_at = self.clock.stamp(&session_id);

        let prior = self.contexts.get(&session_id);
        let intent = extract_intent(&message, prior.as_ref());
        if classify_follow_up(&message, prior.is_some()).is_some() {
            self.contexts.clear(&session_id);
        }

        let aggregated = self.fan_out.aggregate(&message, &session_id).await;
        let composition = self.composer.compose(&intent, &aggregated).await;
        if let Some(next) = composition.next_context {
            self.contexts.set(&session_id, next);
        }

        let replied_at = self.clock.stamp(&session_id);
        let inbound = ConversationTurn::new(&session_id, &message, Sender::User, received_at);
        let outbound =
            ConversationTurn::new(&session_id, &composition.text, Sender::Bot, replied_at);
        self.record(&inbound).await;
        self.record(&outbound).await;

        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = intent.kind.as_code(),
            primary = aggregated.primary.source.as_tag(),
            secondary = aggregated.secondary.source.as_tag(),
            sentiment = aggregated.sentiment.source.as_tag(),
            latency_ms = started.elapsed().as_millis() as u64,
            "chat handled"
        );

        Ok(ChatReply {
            response: composition.text,
            session_id,
            timestamp: outbound.timestamp,
        })
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        self.store.history(session_id).await
    }

    /// Log writes never fail the request.
    async fn record(&self, turn: &ConversationTurn) {
        if let Err(error) = self.store.append(turn).await {
            self.metrics.inc_log_write_failure();
            warn!(
                session_id = %turn.session_id,
                sender = turn.sender.as_code(),
                error = %error,
                "failed to append conversation turn"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use wayfarer_core::{IntentType, ResultSource};
    use wayfarer_providers::{
        Capability, IntentProvider, IntentSignal, ProviderError, ProviderTimeouts,
        SentimentProvider, SentimentSignal, WeatherChain,
    };
    use wayfarer_storage::Store;

    use super::*;

    fn chat(message: &str) -> ValidatedChat {
        ValidatedChat {
            message: message.to_string(),
            session_id: "s-1".to_string(),
        }
    }

    fn offline_agent(store: Arc<Store>) -> (TravelAgent<Store>, Arc<AppMetrics>) {
        let metrics = AppMetrics::shared();
        let agent = TravelAgent::new(
            ProviderRegistry::offline(),
            store,
            SessionContexts::new(),
            metrics.clone(),
        );
        (agent, metrics)
    }

    struct BrokenLog;

    impl ConversationLog for BrokenLog {
        async fn append(&self, _: &ConversationTurn) -> Result<()> {
            Err(anyhow!("table unavailable"))
        }

        async fn get(&self, _: &str, _: i64) -> Result<Option<ConversationTurn>> {
            Ok(None)
        }

        async fn history(&self, _: &str) -> Result<Vec<ConversationTurn>> {
            Ok(Vec::new())
        }
    }

    struct Stalled;

    #[async_trait]
    impl IntentProvider for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn detect_intent(&self, _: &str, _: &str) -> Result<IntentSignal, ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ProviderError::NotConfigured("stalled".to_string()))
        }
    }

    #[async_trait]
    impl SentimentProvider for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn analyze(&self, _: &str) -> Result<SentimentSignal, ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(ProviderError::NotConfigured("stalled".to_string()))
        }
    }

    #[tokio::test]
    async fn every_provider_timing_out_still_replies() {
        let registry = ProviderRegistry {
            primary: Capability::Live(Arc::new(Stalled)),
            secondary: Capability::Live(Arc::new(Stalled)),
            sentiment: Capability::Live(Arc::new(Stalled)),
            timeouts: ProviderTimeouts {
                primary: Duration::from_millis(80),
                secondary: Duration::from_millis(80),
                sentiment: Duration::from_millis(50),
            },
            weather: WeatherChain::synthetic_only(),
        };
        let agent = TravelAgent::new(
            registry,
            Arc::new(Store::memory()),
            SessionContexts::new(),
            AppMetrics::shared(),
        );

        let started = Instant::now();
        let reply = agent
            .handle_chat(chat("Plan a 3-day trip to Paris under €900"))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));

        let summary: Vec<_> = reply.response.lines().take(3).collect();
        assert!(summary
            .iter()
            .all(|line| line.ends_with(ResultSource::TimeoutFallback.as_tag())));
        assert!(reply.response.contains("Here is a 3-day plan for Paris:"));
    }

    #[tokio::test]
    async fn yes_follows_up_on_suggested_weather_check() {
        let (agent, _) = offline_agent(Arc::new(Store::memory()));

        let first = agent
            .handle_chat(chat("Plan a 3-day trip to Paris under €900"))
            .await
            .unwrap();
        assert!(first.response.contains("Day 1:"));
        let pending = agent.contexts().get("s-1").unwrap();
        assert_eq!(pending.suggested_action, IntentType::CheckWeather);

        let second = agent.handle_chat(chat("yes")).await.unwrap();
        assert!(second.response.contains("Current weather in Paris"));
        assert!(agent.contexts().get("s-1").is_none());
    }

    #[tokio::test]
    async fn no_clears_the_suggestion() {
        let (agent, _) = offline_agent(Arc::new(Store::memory()));
        agent
            .handle_chat(chat("Find flights to Tokyo"))
            .await
            .unwrap();
        assert!(agent.contexts().get("s-1").is_some());

        let reply = agent.handle_chat(chat("no thanks")).await.unwrap();
        assert!(agent.contexts().get("s-1").is_none());
        assert!(!reply.response.contains("Day 1:"));
    }

    #[tokio::test]
    async fn turns_are_logged_in_order_with_distinct_keys() {
        let store = Arc::new(Store::memory());
        let (agent, _) = offline_agent(store.clone());

        let reply = agent
            .handle_chat(chat("Plan a trip to Atlantis"))
            .await
            .unwrap();

        let history = agent.history("s-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].message, "Plan a trip to Atlantis");
        assert_eq!(history[1].sender, Sender::Bot);
        assert_eq!(history[1].message, reply.response);
        assert!(history[1].timestamp > history[0].timestamp);
        assert_eq!(history[1].timestamp, reply.timestamp);

        let stored = store.get("s-1", history[0].timestamp).await.unwrap();
        assert_eq!(stored.map(|turn| turn.message), Some(history[0].message.clone()));
    }

    #[tokio::test]
    async fn concurrent_requests_on_one_session_keep_every_turn() {
        let (agent, metrics) = offline_agent(Arc::new(Store::memory()));

        let (first, second) = tokio::join!(
            agent.handle_chat(chat("hello")),
            agent.handle_chat(chat("hi there"))
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_ne!(first.timestamp, second.timestamp);

        let history = agent.history("s-1").await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(metrics.snapshot().log_write_failures_total, 0);
        assert!(history
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));

        let users: Vec<_> = history
            .iter()
            .filter(|turn| turn.sender == Sender::User)
            .map(|turn| turn.message.as_str())
            .collect();
        assert_eq!(users.len(), 2);
        assert!(users.contains(&"hello") && users.contains(&"hi there"));
    }

    #[tokio::test]
    async fn unknown_destination_uses_generic_plan_with_default_budget() {
        let (agent, _) = offline_agent(Arc::new(Store::memory()));
        let reply = agent
            .handle_chat(chat("Plan a trip to Atlantis"))
            .await
            .unwrap();

        assert!(reply.response.contains("Here is a 3-day plan for Atlantis:"));
        assert!(reply.response.contains("Budget: 1000 for 3 days"));
    }

    #[tokio::test]
    async fn log_failures_do_not_fail_the_reply() {
        let metrics = AppMetrics::shared();
        let agent = TravelAgent::new(
            ProviderRegistry::offline(),
            Arc::new(BrokenLog),
            SessionContexts::new(),
            metrics.clone(),
        );

        let reply = agent.handle_chat(chat("hello there")).await.unwrap();
        assert!(reply.response.starts_with("[Primary intent]"));
        assert_eq!(metrics.snapshot().log_write_failures_total, 2);
        assert_eq!(metrics.snapshot().requests_total, 1);
    }

    #[tokio::test]
    async fn offline_summary_tags_every_slot() {
        let (agent, _) = offline_agent(Arc::new(Store::memory()));
        let reply = agent.handle_chat(chat("hello")).await.unwrap();
        let tag = format!("| {}", ResultSource::Mock.as_tag());
        assert_eq!(
            reply
                .response
                .lines()
                .take(3)
                .filter(|line| line.ends_with(&tag))
                .count(),
            3
        );
    }
}
