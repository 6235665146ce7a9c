//! Deterministic local stand-ins for provider answers.

use wayfarer_core::{classify_intent_rules, score_sentiment};

use crate::{IntentSignal, SentimentSignal};

/// Canned low-confidence answer for the secondary dialog slot.
pub const DEFAULT_DIALOG_INTENT: &str = "general";
const DEFAULT_DIALOG_CONFIDENCE: f32 = 0.3;

const HEURISTIC_CONFIDENCE: f32 = 0.6;
const MOCK_DIALOG_CONFIDENCE: f32 = 0.7;

/// Local keyword classification, used in place of the primary provider.
pub fn heuristic_intent(message: &str) -> IntentSignal {
    IntentSignal {
        intent: classify_intent_rules(message).as_code().to_string(),
        confidence: HEURISTIC_CONFIDENCE,
    }
}

/// Mocked dialog answer: the keyword classification at a slightly higher
/// confidence so it is distinguishable from the error fallback.
pub fn mock_dialog_intent(message: &str) -> IntentSignal {
    IntentSignal {
        intent: classify_intent_rules(message).as_code().to_string(),
        confidence: MOCK_DIALOG_CONFIDENCE,
    }
}

pub fn default_dialog_intent() -> IntentSignal {
    IntentSignal {
        intent: DEFAULT_DIALOG_INTENT.to_string(),
        confidence: DEFAULT_DIALOG_CONFIDENCE,
    }
}

pub fn lexicon_sentiment(message: &str) -> SentimentSignal {
    let (label, score) = score_sentiment(message);
    SentimentSignal { label, score }
}
