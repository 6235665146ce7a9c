pub mod input;
pub mod intent;
pub mod knowledge;
pub mod models;
pub mod planner;
pub mod sentiment;

pub use input::{sanitize_message, validate_chat_request, ValidatedChat, ValidationError};
pub use intent::{
    classify_follow_up, classify_intent_rules, extract_entities, extract_intent, FollowUp,
};
pub use models::*;
pub use planner::{
    budget_analysis, build_itinerary, clarifying_question, compose_flight_options,
    compose_general_reply, compose_trip_plan, compose_weather_reply, provider_summary,
    BudgetAnalysis, BudgetTier,
};
pub use sentiment::score_sentiment;
