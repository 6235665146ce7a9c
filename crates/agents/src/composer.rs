use std::sync::Arc;

use tracing::debug;
use wayfarer_core::{
    clarifying_question, compose_flight_options, compose_general_reply, compose_trip_plan,
    compose_weather_reply, provider_summary, AggregatedResult, Intent, IntentType,
    SuggestedAction,
};
use wayfarer_observability::AppMetrics;
use wayfarer_providers::WeatherChain;

#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub text: String,
    /// Suggestion to remember for the next turn, if this reply made one.
    pub next_context: Option<SuggestedAction>,
}

#[derive(Clone)]
pub struct ResponseComposer {
    weather: WeatherChain,
    metrics: Arc<AppMetrics>,
}

impl ResponseComposer {
    pub fn new(weather: WeatherChain, metrics: Arc<AppMetrics>) -> Self {
        Self { weather, metrics }
    }

    pub async fn compose(&self, intent: &Intent, aggregated: &AggregatedResult) -> Composition {
        let entities = &intent.entities;
        let (body, next_context) = match intent.kind {
            IntentType::PlanTrip => (
                compose_trip_plan(entities, true),
                Some(SuggestedAction {
                    suggested_action: IntentType::CheckWeather,
                    entities: entities.clone(),
                }),
            ),
            IntentType::CheckWeather => match entities.destination.as_deref() {
                Some(destination) => (self.weather_reply(destination).await, None),
                None => (clarifying_question(intent.kind).to_string(), None),
            },
            IntentType::FindFlights => match entities.destination {
                Some(_) => (
                    compose_flight_options(entities),
                    Some(SuggestedAction {
                        suggested_action: IntentType::PlanTrip,
                        entities: entities.clone(),
                    }),
                ),
                None => (clarifying_question(intent.kind).to_string(), None),
            },
            IntentType::CreateItinerary => (compose_trip_plan(entities, false), None),
            IntentType::General => (
                compose_general_reply(aggregated.sentiment_label()).to_string(),
                None,
            ),
        };

        Composition {
            text: format!("{}\n\n{}", provider_summary(aggregated), body),
            next_context,
        }
    }

    async fn weather_reply(&self, destination: &str) -> String {
        let report = self.weather.lookup(destination).await;
        if report.source.is_none() {
            debug!(destination, "using synthetic weather");
            self.metrics.inc_weather_synthetic();
        }
        compose_weather_reply(destination, &report)
    }
}
