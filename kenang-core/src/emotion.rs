//! Emotion Tracker — histogram of the companion's own reply sentiment.

use serde::Serialize;
use tracing::debug;

use crate::lexicon;
use crate::memory::LongTermMemory;
use crate::types::SentimentBucket;

/// Facial expression a host can show for the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    /// Resting.
    Idle,
    /// A turn is in flight.
    Talk,
    /// Last reply scored positive.
    Happy,
    /// Last reply scored negative.
    Sad,
}

impl From<SentimentBucket> for Expression {
    fn from(bucket: SentimentBucket) -> Self {
        match bucket {
            SentimentBucket::Positive => Self::Happy,
            SentimentBucket::Negative => Self::Sad,
            SentimentBucket::Neutral => Self::Idle,
        }
    }
}

/// Record the sentiment of an assistant reply score.
///
/// Returns the bucket that was incremented.
pub fn record(memory: &mut LongTermMemory, reply_score: i32) -> SentimentBucket {
    let bucket = SentimentBucket::from_score(reply_score);
    let count = memory.record_emotion(bucket);
    debug!(bucket = %bucket, count, "Recorded reply sentiment");
    bucket
}

/// Score `reply` with the lexicon and record it.
pub fn record_reply(memory: &mut LongTermMemory, reply: &str) -> SentimentBucket {
    record(memory, lexicon::score(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_counted_independently() {
        let mut memory = LongTermMemory::new();
        record(&mut memory, 2);
        record(&mut memory, 1);
        record(&mut memory, -4);
        record(&mut memory, 0);

        let patterns = &memory.emotion_patterns;
        assert_eq!(patterns.get(SentimentBucket::Positive), 2);
        assert_eq!(patterns.get(SentimentBucket::Negative), 1);
        assert_eq!(patterns.get(SentimentBucket::Neutral), 1);
    }

    #[test]
    fn reply_text_is_scored() {
        let mut memory = LongTermMemory::new();
        let bucket = record_reply(&mut memory, "Senang mendengarnya, terima kasih sudah cerita.");
        assert_eq!(bucket, SentimentBucket::Positive);
        assert_eq!(Expression::from(bucket), Expression::Happy);
    }
}
