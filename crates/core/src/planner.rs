use crate::knowledge::{activities_for, display_name, MOCK_FLIGHT_OPTIONS};
use crate::models::{AggregatedResult, EntityBag, IntentType, Sentiment, WeatherReport};

pub const DEFAULT_TRIP_DAYS: u32 = 3;
pub const DEFAULT_TRIP_BUDGET: u64 = 1_000;
pub const MAX_ITINERARY_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn from_daily_budget(daily: f64) -> Self {
        if daily < 70.0 {
            Self::Low
        } else if daily < 135.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Fixed estimate of spend per day for the tier.
    pub fn daily_rate(self) -> u64 {
        match self {
            Self::Low => 50,
            Self::Medium => 100,
            Self::High => 200,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetAnalysis {
    pub days: u32,
    pub budget: u64,
    pub daily_budget: f64,
    pub tier: BudgetTier,
    pub estimated_cost: u64,
}

impl BudgetAnalysis {
    pub fn is_sufficient(&self) -> bool {
        self.budget >= self.estimated_cost
    }
}

pub fn budget_analysis(entities: &EntityBag) -> BudgetAnalysis {
    let days = trip_days(entities);
    let budget = entities.budget.unwrap_or(DEFAULT_TRIP_BUDGET);
    let daily_budget = budget as f64 / days as f64;
    let tier = BudgetTier::from_daily_budget(daily_budget);

    BudgetAnalysis {
        days,
        budget,
        daily_budget,
        tier,
        estimated_cost: u64::from(days) * tier.daily_rate(),
    }
}

/// Day-by-day lines for `days` days, cycling through the destination template
/// when the trip outlasts it.
pub fn build_itinerary(destination: Option<&str>, days: u32) -> Vec<String> {
    let activities = activities_for(destination.unwrap_or_default());
    let days = days.clamp(1, MAX_ITINERARY_DAYS);

    (0..days as usize)
        .map(|index| {
            format!(
                "Day {}: {}",
                index + 1,
                activities[index % activities.len()]
            )
        })
        .collect()
}

pub fn compose_trip_plan(entities: &EntityBag, include_budget: bool) -> String {
    let days = trip_days(entities);
    let place = entities
        .destination
        .as_deref()
        .map(display_name)
        .unwrap_or_else(|| "your destination".to_string());

    let mut lines = vec![format!("Here is a {}-day plan for {}:", days, place)];
    lines.extend(build_itinerary(entities.destination.as_deref(), days));

    if include_budget {
        let analysis = budget_analysis(entities);
        lines.push(String::new());
        lines.push(format!(
            "Budget: {} for {} days ({:.0} per day, {} tier).",
            analysis.budget,
            analysis.days,
            analysis.daily_budget,
            analysis.tier.as_code()
        ));
        if analysis.is_sufficient() {
            lines.push(format!(
                "Estimated cost is {}, so your budget should cover the trip.",
                analysis.estimated_cost
            ));
        } else {
            lines.push(format!(
                "Estimated cost is {}, about {} more than your budget.",
                analysis.estimated_cost,
                analysis.estimated_cost - analysis.budget
            ));
        }
        lines.push(format!(
            "Would you like me to check the weather in {}?",
            place
        ));
    }

    lines.join("\n")
}

pub fn compose_weather_reply(destination: &str, report: &WeatherReport) -> String {
    let mut text = format!(
        "Current weather in {}: {:.1}°C, {}.",
        display_name(destination),
        report.temperature_c,
        report.condition
    );
    if let Some(humidity) = report.humidity {
        text.push_str(&format!(" Humidity {}%.", humidity));
    }
    if let Some(wind) = report.wind_kph {
        text.push_str(&format!(" Wind {:.0} km/h.", wind));
    }
    match report.source.as_deref() {
        Some(source) => text.push_str(&format!(" (source: {})", source)),
        None => text.push_str(" (estimated, live weather unavailable)"),
    }
    text
}

pub fn compose_flight_options(entities: &EntityBag) -> String {
    let destination = entities
        .destination
        .as_deref()
        .map(display_name)
        .unwrap_or_default();
    let header = match entities.departure.as_deref() {
        Some(departure) => format!(
            "Flight options from {} to {}:",
            display_name(departure),
            destination
        ),
        None => format!("Flight options to {}:", destination),
    };

    let mut lines = vec![header];
    for (index, option) in MOCK_FLIGHT_OPTIONS.iter().enumerate() {
        let stops = match option.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        lines.push(format!(
            "{}. {} departing {}, {} ({}), {}",
            index + 1,
            option.airline,
            option.departs,
            option.duration,
            stops,
            option.price
        ));
    }
    lines.push(format!(
        "Would you like me to plan a trip to {}?",
        destination
    ));
    lines.join("\n")
}

pub fn compose_general_reply(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment {
        Some(Sentiment::Positive) => {
            "Love the enthusiasm! I can plan a trip, check the weather, find flights or build an itinerary. Where would you like to go?"
        }
        Some(Sentiment::Negative) => {
            "Sorry things are frustrating. Tell me where you are headed and I will help sort out plans, weather or flights."
        }
        Some(Sentiment::Neutral) | None => {
            "I can help you plan a trip, check the weather, find flights or create an itinerary. What would you like to do?"
        }
    }
}

pub fn clarifying_question(kind: IntentType) -> &'static str {
    match kind {
        IntentType::CheckWeather => "Which city would you like the weather for?",
        IntentType::FindFlights => "Where would you like to fly to?",
        IntentType::PlanTrip | IntentType::CreateItinerary => {
            "Where would you like to go, and for how many days?"
        }
        IntentType::General => "How can I help with your travel plans?",
    }
}

/// One line per provider slot: label, chosen value and where it came from.
pub fn provider_summary(aggregated: &AggregatedResult) -> String {
    aggregated
        .results()
        .iter()
        .map(|result| {
            format!(
                "[{}] {} | {}",
                result.origin.label(),
                result.payload.summary_value(),
                result.source.as_tag()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn trip_days(entities: &EntityBag) -> u32 {
    entities.duration.unwrap_or(DEFAULT_TRIP_DAYS).max(1)
}
