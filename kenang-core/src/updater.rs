//! Memory Updater — heuristic extraction of facts, preferences and keywords.
//!
//! An utterance is classified by marker substrings (case-insensitive):
//!
//! | first person (`saya`/`aku`) and … | goes to       |
//! |-----------------------------------|---------------|
//! | `bekerja` or `tinggal di`         | `facts`       |
//! | `suka` or `hobi`                  | `preferences` |
//!
//! Matching utterances are stored verbatim. `last_updated` moves only when a
//! fact or preference was actually added.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::keywords;
use crate::memory::LongTermMemory;

/// First-person markers.
pub const FIRST_PERSON_MARKERS: &[&str] = &["saya", "aku"];
/// Work or residency markers.
pub const FACT_MARKERS: &[&str] = &["bekerja", "tinggal di"];
/// Like or hobby markers.
pub const PREFERENCE_MARKERS: &[&str] = &["suka", "hobi"];

/// Which collections an utterance belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtteranceClass {
    /// Biographical statement.
    pub is_fact: bool,
    /// Stated like or hobby.
    pub is_preference: bool,
}

/// Classify an utterance by its markers.
#[must_use]
pub fn classify(utterance: &str) -> UtteranceClass {
    let lower = utterance.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if !has_any(FIRST_PERSON_MARKERS) {
        return UtteranceClass::default();
    }
    UtteranceClass {
        is_fact: has_any(FACT_MARKERS),
        is_preference: has_any(PREFERENCE_MARKERS),
    }
}

/// What one update changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUpdate {
    /// The utterance was new to `facts`.
    pub fact_added: bool,
    /// The utterance was new to `preferences`.
    pub preference_added: bool,
    /// Number of keywords new to `keywords`.
    pub keywords_added: usize,
}

impl MemoryUpdate {
    /// Whether anything changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.fact_added && !self.preference_added && self.keywords_added == 0
    }
}

/// Commit an utterance the analyzer flagged as worth remembering.
///
/// `keyword_limit` bounds how many extracted keywords are merged.
pub fn remember(
    memory: &mut LongTermMemory,
    utterance: &str,
    keyword_limit: usize,
    now: DateTime<Utc>,
) -> MemoryUpdate {
    let class = classify(utterance);
    let mut update = MemoryUpdate::default();

    if class.is_fact {
        update.fact_added = memory.absorb_fact(utterance);
    }
    if class.is_preference {
        update.preference_added = memory.absorb_preference(utterance);
    }
    if update.fact_added || update.preference_added {
        memory.touch(now);
    }

    let extracted = keywords::extract(utterance, keyword_limit);
    update.keywords_added = memory.absorb_keywords(&extracted);

    debug!(
        fact = update.fact_added,
        preference = update.preference_added,
        keywords = update.keywords_added,
        "Memory updated"
    );
    update
}
