use crate::models::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "love", "great", "amazing", "awesome", "excited", "excellent", "wonderful", "happy",
    "fantastic", "perfect", "thanks", "thank", "beautiful", "good", "nice", "enjoy",
];

const NEGATIVE_WORDS: &[&str] = &[
    "hate", "bad", "terrible", "awful", "angry", "sad", "worried", "annoyed", "cancelled",
    "delayed", "horrible", "worst", "problem", "disappointed", "stressed", "lost",
];

/// Lexicon-based sentiment. Returns the label and a score in `0..=1` where
/// 0.5 is neutral.
pub fn score_sentiment(message: &str) -> (Sentiment, f32) {
    let mut positive = 0_i32;
    let mut negative = 0_i32;

    for word in message
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
    {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1;
        }
    }

    let total = positive + negative;
    if total == 0 || positive == negative {
        return (Sentiment::Neutral, 0.5);
    }

    let score = 0.5 + 0.5 * (positive - negative) as f32 / total as f32;
    let label = if positive > negative {
        Sentiment::Positive
    } else {
        Sentiment::Negative
    };
    (label, score.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_word_balance() {
        assert_eq!(score_sentiment("I love this, amazing!").0, Sentiment::Positive);
        assert_eq!(
            score_sentiment("my flight was delayed, terrible").0,
            Sentiment::Negative
        );
        assert_eq!(score_sentiment("what is the time"), (Sentiment::Neutral, 0.5));
    }

    #[test]
    fn score_stays_in_unit_range() {
        let (_, high) = score_sentiment("great great great");
        let (_, low) = score_sentiment("awful awful");
        assert!((high - 1.0).abs() < f32::EPSILON);
        assert!(low.abs() < f32::EPSILON);
    }
}
