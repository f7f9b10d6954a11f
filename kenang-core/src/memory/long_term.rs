//! Long-Term Memory Store — normalization and set-union merges.
//!
//! The persisted blob is an opaque JSON object owned by an external store, so
//! every load goes through [`LongTermMemory::normalize`], which accepts any
//! JSON value and never fails. Missing or wrong-typed fields fall back to
//! their empty defaults and duplicate set entries are collapsed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::types::SentimentBucket;

/// Histogram of reply sentiment, keyed by bucket.
///
/// Counters only ever grow. A bucket that was never recorded is absent, which
/// keeps an untouched histogram serialized as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmotionPatterns(BTreeMap<SentimentBucket, u64>);

impl EmotionPatterns {
    /// Increment `bucket` by one and return its new count.
    pub fn increment(&mut self, bucket: SentimentBucket) -> u64 {
        let slot = self.0.entry(bucket).or_insert(0);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Current count for `bucket` (zero if never recorded).
    #[must_use]
    pub fn get(&self, bucket: SentimentBucket) -> u64 {
        self.0.get(&bucket).copied().unwrap_or(0)
    }

    /// Whether no bucket has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    /// Recorded buckets in histogram order.
    pub fn iter(&self) -> impl Iterator<Item = (SentimentBucket, u64)> + '_ {
        self.0.iter().map(|(b, c)| (*b, *c))
    }

    /// Compact JSON rendering, e.g. `{"positive":2,"neutral":1}`.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn from_value(value: Option<&Value>) -> Self {
        let mut patterns = Self::default();
        let Some(Value::Object(map)) = value else {
            return patterns;
        };
        for (key, count) in map {
            match (SentimentBucket::from_key(key), count.as_u64()) {
                (Some(bucket), Some(count)) => {
                    patterns.0.insert(bucket, count);
                }
                _ => debug!(key = %key, "Dropping unrecognised emotion bucket"),
            }
        }
        patterns
    }
}

/// Durable memory of one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LongTermMemory {
    /// Condensed view of the recent dialogue; overwritten every turn.
    pub summary: String,
    /// Verbatim biographical statements, de-duplicated, first-seen order.
    pub facts: Vec<String>,
    /// Verbatim statements of likes and hobbies, same shape as `facts`.
    pub preferences: Vec<String>,
    /// Salient tokens accumulated across turns. Never pruned.
    pub keywords: Vec<String>,
    /// Reply sentiment histogram.
    pub emotion_patterns: EmotionPatterns,
    /// Last time a fact or preference was added.
    pub last_updated: Option<DateTime<Utc>>,
}

impl LongTermMemory {
    /// Create an all-defaults memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coerce an arbitrary JSON value into a well-formed memory.
    ///
    /// Total: every field with the wrong shape becomes its empty default,
    /// set-like arrays keep only their string entries (de-duplicated), and the
    /// histogram keeps only the three known buckets with integer counts.
    #[must_use]
    pub fn normalize(raw: &Value) -> Self {
        let field = |name: &str| raw.as_object().and_then(|o| o.get(name));

        let summary = match field("summary") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };

        let last_updated = field("last_updated")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            summary,
            facts: string_set(field("facts")),
            preferences: string_set(field("preferences")),
            keywords: string_set(field("keywords")),
            emotion_patterns: EmotionPatterns::from_value(field("emotion_patterns")),
            last_updated,
        }
    }

    /// Serialize into the persisted blob shape.
    #[must_use]
    pub fn to_blob(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }

    /// Add a biographical statement. Returns `true` if it was new.
    pub fn absorb_fact(&mut self, utterance: &str) -> bool {
        merge_unique(&mut self.facts, [utterance]) > 0
    }

    /// Add a preference statement. Returns `true` if it was new.
    pub fn absorb_preference(&mut self, utterance: &str) -> bool {
        merge_unique(&mut self.preferences, [utterance]) > 0
    }

    /// Merge keywords. Returns how many were new.
    pub fn absorb_keywords<S: AsRef<str>>(&mut self, keywords: &[S]) -> usize {
        merge_unique(&mut self.keywords, keywords.iter().map(|k| k.as_ref()))
    }

    /// Bump the reply-sentiment histogram. Returns the bucket's new count.
    pub fn record_emotion(&mut self, bucket: SentimentBucket) -> u64 {
        self.emotion_patterns.increment(bucket)
    }

    /// Mark facts or preferences as changed at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(now);
    }
}

/// Set-union `items` into `target`, preserving first-insertion order.
/// Returns the number of entries actually added.
fn merge_unique<'a>(target: &mut Vec<String>, items: impl IntoIterator<Item = &'a str>) -> usize {
    let mut added = 0;
    for item in items {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
            added += 1;
        }
    }
    added
}

fn string_set(value: Option<&Value>) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(Value::Array(items)) = value {
        merge_unique(&mut out, items.iter().filter_map(Value::as_str));
    }
    out
}
