use once_cell::sync::Lazy;
use regex::Regex;

use crate::knowledge::{is_stop_word, lookup_destination};
use crate::models::{DurationUnit, EntityBag, Intent, IntentType, SuggestedAction};

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)[\s-]*(day|week|month)").expect("valid duration regex")
});

static BUDGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[$€£]\s*(\d[\d,]*)|(\d[\d,]*)\s*(?:[$€£]|\beuros?\b|\beur\b|\busd\b|\bdollars?\b)",
    )
    .expect("valid budget regex")
});

static DEPARTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)from\s+([a-z\s]+?)(?:\s+to\b|\s*$)").expect("valid departure regex")
});

const AFFIRMATIVE_WORDS: &[&str] = &["yes", "sure", "ok", "y"];
const NEGATIVE_WORDS: &[&str] = &["no", "not"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Affirmative,
    Negative,
}

/// One classification rule. Rules are evaluated top to bottom and the first
/// match decides the intent.
struct IntentRule {
    intent: IntentType,
    matches: fn(&str) -> bool,
}

const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: IntentType::PlanTrip,
        matches: mentions_trip_planning,
    },
    IntentRule {
        intent: IntentType::CheckWeather,
        matches: mentions_weather,
    },
    IntentRule {
        intent: IntentType::FindFlights,
        matches: mentions_flights,
    },
    IntentRule {
        intent: IntentType::CreateItinerary,
        matches: mentions_itinerary,
    },
];

fn mentions_trip_planning(lower: &str) -> bool {
    lower.contains("plan") && contains_any(lower, &["trip", "travel"])
}

fn mentions_weather(lower: &str) -> bool {
    contains_any(lower, &["weather", "temperature"])
}

fn mentions_flights(lower: &str) -> bool {
    contains_any(lower, &["flight", "fly", "ticket", "book", "airline"])
}

fn mentions_itinerary(lower: &str) -> bool {
    contains_any(lower, &["itinerary", "schedule"])
}

/// Decides whether a message is a short yes/no answer to the last suggestion.
/// Affirmatives only count when there is a suggestion to accept.
pub fn classify_follow_up(message: &str, has_context: bool) -> Option<FollowUp> {
    let words = words_lower(message);
    if has_context && words.iter().any(|word| AFFIRMATIVE_WORDS.contains(&word.as_str())) {
        return Some(FollowUp::Affirmative);
    }
    if words.iter().any(|word| NEGATIVE_WORDS.contains(&word.as_str())) {
        return Some(FollowUp::Negative);
    }
    None
}

pub fn extract_intent(message: &str, prior: Option<&SuggestedAction>) -> Intent {
    match (prior, classify_follow_up(message, prior.is_some())) {
        (Some(context), Some(FollowUp::Affirmative)) => {
            Intent::new(context.suggested_action, context.entities.clone())
        }
        (_, Some(FollowUp::Negative)) => Intent::general(),
        _ => {
            let kind = classify_intent_rules(message);
            Intent::new(kind, extract_entities(message, kind))
        }
    }
}

pub fn classify_intent_rules(message: &str) -> IntentType {
    let lower = message.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|rule| (rule.matches)(&lower))
        .map(|rule| rule.intent)
        .unwrap_or(IntentType::General)
}

pub fn extract_entities(message: &str, kind: IntentType) -> EntityBag {
    let lower = message.to_lowercase();
    let mut entities = EntityBag {
        destination: extract_destination(&lower),
        budget: extract_budget(message),
        ..EntityBag::default()
    };

    if let Some((value, unit)) = extract_duration(message) {
        entities.duration = Some(value.saturating_mul(unit.days()));
        entities.duration_unit = Some(unit);
    }

    if kind == IntentType::FindFlights {
        entities.departure = extract_departure(message);
    }

    entities
}

fn extract_destination(lower: &str) -> Option<String> {
    if let Some(canonical) = lookup_destination(lower) {
        return Some(canonical.to_string());
    }

    lower
        .split_whitespace()
        .find(|word| {
            word.chars().count() > 3
                && word.chars().all(char::is_alphabetic)
                && !is_stop_word(word)
        })
        .map(ToString::to_string)
}

fn extract_duration(message: &str) -> Option<(u32, DurationUnit)> {
    let captures = DURATION_RE.captures(message)?;
    let value = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let unit = DurationUnit::parse(captures.get(2)?.as_str())?;
    Some((value, unit))
}

fn extract_budget(message: &str) -> Option<u64> {
    let captures = BUDGET_RE.captures(message)?;
    let amount = captures.get(1).or_else(|| captures.get(2))?;
    amount.as_str().replace(',', "").parse::<u64>().ok()
}

fn extract_departure(message: &str) -> Option<String> {
    let captures = DEPARTURE_RE.captures(message)?;
    let departure = captures.get(1)?.as_str().trim().to_lowercase();
    if departure.is_empty() {
        None
    } else {
        Some(departure)
    }
}

fn words_lower(message: &str) -> Vec<String> {
    message
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_trip_scenario_extracts_all_entities() {
        let intent = extract_intent("Plan a 3-day trip to Paris under €900", None);
        assert_eq!(intent.kind, IntentType::PlanTrip);
        assert_eq!(intent.entities.destination.as_deref(), Some("paris"));
        assert_eq!(intent.entities.duration, Some(3));
        assert_eq!(intent.entities.duration_unit, Some(DurationUnit::Day));
        assert_eq!(intent.entities.budget, Some(900));
        assert_eq!(intent.entities.departure, None);
    }

    #[test]
    fn affirmative_reuses_suggested_action() {
        let context = SuggestedAction {
            suggested_action: IntentType::CheckWeather,
            entities: EntityBag {
                destination: Some("paris".to_string()),
                ..EntityBag::default()
            },
        };
        let intent = extract_intent("yes", Some(&context));
        assert_eq!(intent.kind, IntentType::CheckWeather);
        assert_eq!(intent.entities.destination.as_deref(), Some("paris"));
        assert_eq!(
            classify_follow_up("Sure!", true),
            Some(FollowUp::Affirmative)
        );
    }

    #[test]
    fn affirmative_without_context_is_plain_classification() {
        assert_eq!(classify_follow_up("yes", false), None);
        assert_eq!(extract_intent("yes", None).kind, IntentType::General);
    }

    #[test]
    fn negative_returns_general_with_empty_entities() {
        let context = SuggestedAction {
            suggested_action: IntentType::PlanTrip,
            entities: EntityBag::default(),
        };
        let intent = extract_intent("no thanks, not now", Some(&context));
        assert_eq!(intent, Intent::general());
        assert!(intent.entities.is_empty());
    }

    #[test]
    fn follow_up_words_match_whole_words_only() {
        assert_eq!(classify_follow_up("I know Norway is lovely", true), None);
        assert_eq!(classify_follow_up("Book it today", true), None);
    }

    #[test]
    fn rules_follow_priority_order() {
        assert_eq!(
            classify_intent_rules("PLAN my TRAVEL and check the weather"),
            IntentType::PlanTrip
        );
        assert_eq!(
            classify_intent_rules("what's the temperature before my flight"),
            IntentType::CheckWeather
        );
        assert_eq!(classify_intent_rules("book a ticket"), IntentType::FindFlights);
        assert_eq!(
            classify_intent_rules("build my schedule"),
            IntentType::CreateItinerary
        );
        assert_eq!(classify_intent_rules("hello there"), IntentType::General);
    }

    #[test]
    fn plan_and_trip_in_any_casing_is_plan_trip() {
        for message in [
            "plan a trip",
            "PLAN A TRIP",
            "Plan some Travel",
            "can you pLaN my tRiP to Rome",
        ] {
            assert_eq!(extract_intent(message, None).kind, IntentType::PlanTrip);
        }
    }

    #[test]
    fn destination_is_case_insensitive_and_deterministic() {
        let variants = ["trip to TOKYO", "trip to tokyo", "Trip To Tokyo"];
        for message in variants {
            assert_eq!(
                extract_entities(message, IntentType::General)
                    .destination
                    .as_deref(),
                Some("tokyo")
            );
        }
        assert_eq!(
            extract_entities("visit Japan", IntentType::General)
                .destination
                .as_deref(),
            Some("tokyo")
        );
    }

    #[test]
    fn unmapped_city_falls_back_to_first_long_word() {
        let intent = extract_intent("Plan a trip to Atlantis", None);
        assert_eq!(intent.kind, IntentType::PlanTrip);
        assert_eq!(intent.entities.destination.as_deref(), Some("atlantis"));
        assert_eq!(intent.entities.budget, None);
        assert_eq!(intent.entities.duration, None);
    }

    #[test]
    fn weather_question_without_place_has_no_destination() {
        let intent = extract_intent("What's the weather?", None);
        assert_eq!(intent.kind, IntentType::CheckWeather);
        assert_eq!(intent.entities.destination, None);

        let sanitized = extract_intent("Whats the weather like", None);
        assert_eq!(sanitized.entities.destination, None);
    }

    #[test]
    fn week_and_month_durations_are_converted_to_days() {
        let weeks = extract_entities("two options: 2 weeks in Rome", IntentType::PlanTrip);
        assert_eq!(weeks.duration, Some(14));
        assert_eq!(weeks.duration_unit, Some(DurationUnit::Week));

        let month = extract_entities("1 month in Bali", IntentType::PlanTrip);
        assert_eq!(month.duration, Some(30));
    }

    #[test]
    fn budget_accepts_symbol_before_after_and_words() {
        let cases = [
            ("under $1,200", Some(1200)),
            ("about 800€ total", Some(800)),
            ("budget 500 euro", Some(500)),
            ("around 650 euros", Some(650)),
            ("£300 max", Some(300)),
            ("5 days", None),
        ];
        for (message, expected) in cases {
            assert_eq!(extract_budget(message), expected, "{message}");
        }
    }

    #[test]
    fn departure_only_extracted_for_flight_search() {
        let flights = extract_intent("Find flights from London to Rome", None);
        assert_eq!(flights.kind, IntentType::FindFlights);
        assert_eq!(flights.entities.departure.as_deref(), Some("london"));

        let trip = extract_entities("plan a trip from London to Rome", IntentType::PlanTrip);
        assert_eq!(trip.departure, None);

        let trailing = extract_entities("fly out from san francisco", IntentType::FindFlights);
        assert_eq!(trailing.departure.as_deref(), Some("san francisco"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let context = SuggestedAction {
            suggested_action: IntentType::PlanTrip,
            entities: EntityBag {
                destination: Some("rome".to_string()),
                ..EntityBag::default()
            },
        };
        for message in ["yes", "Plan a 5 day trip to Rome for $2000", "hi"] {
            assert_eq!(
                extract_intent(message, Some(&context)),
                extract_intent(message, Some(&context))
            );
        }
    }
}
