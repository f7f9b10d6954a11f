//! Durable and recent dialogue memory.
//!
//! - [`LongTermMemory`] — facts, preferences, keywords, emotion histogram and
//!   rolling summary; the only state that is persisted.
//! - [`ShortTermBuffer`] — the most recent turns of the running session.

pub mod long_term;
pub mod short_term;

pub use long_term::{EmotionPatterns, LongTermMemory};
pub use short_term::{ShortTermBuffer, DEFAULT_SHORT_TERM_CAPACITY};
