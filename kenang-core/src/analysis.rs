//! Input Analyzer — derives the response directive for one user message.
//!
//! The derivation is a fixed sequence of thresholds on a composite
//! "potential score":
//!
//! ```text
//! potential = 0.4 · min(len/80, 1) + 0.3 · min(|sentiment|/3, 1) + 0.3 · min(turns/10, 1)
//! ```
//!
//! Every comparison is strict, so a score of exactly `0.6` still yields the
//! short style.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::lexicon;

/// Substrings that mark a message as worth remembering.
pub const REMEMBER_MARKERS: &[&str] = &["saya", "aku", "hobi", "kerja", "tinggal", "suka"];

/// Characters at which the length component saturates.
const LENGTH_SATURATION: f64 = 80.0;
/// Absolute sentiment at which the emotion component saturates.
const EMOTION_SATURATION: f64 = 3.0;
/// Interaction count at which the familiarity component saturates.
const INTERACTION_SATURATION: f64 = 10.0;

/// Emotional register of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    /// Positive input.
    #[serde(rename = "hangat")]
    Warm,
    /// Negative input.
    #[serde(rename = "menenangkan")]
    Soothing,
    /// No polarity.
    #[serde(rename = "netral")]
    Neutral,
}

impl Tone {
    /// Tone for a lexicon score.
    #[must_use]
    pub fn from_sentiment(sentiment: i32) -> Self {
        match sentiment {
            s if s > 0 => Self::Warm,
            s if s < 0 => Self::Soothing,
            _ => Self::Neutral,
        }
    }

    /// Label used in the prompt.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "hangat",
            Self::Soothing => "menenangkan",
            Self::Neutral => "netral",
        }
    }
}

/// What the reply should achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Goal {
    /// The user asked a question.
    #[serde(rename = "menjawab dengan jelas")]
    AnswerClearly,
    /// Anything else.
    #[serde(rename = "memberi tanggapan terstruktur")]
    StructuredResponse,
}

impl Goal {
    /// Goal for a message: questions get a clear answer.
    #[must_use]
    pub fn for_text(text: &str) -> Self {
        if text.ends_with('?') {
            Self::AnswerClearly
        } else {
            Self::StructuredResponse
        }
    }

    /// Label used in the prompt.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnswerClearly => "menjawab dengan jelas",
            Self::StructuredResponse => "memberi tanggapan terstruktur",
        }
    }
}

/// Depth of the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseStyle {
    /// Potential score above 0.6.
    #[serde(rename = "mendalam")]
    InDepth,
    /// Everything else.
    #[serde(rename = "ringkas")]
    Concise,
}

impl ResponseStyle {
    /// Style for a potential score.
    #[must_use]
    pub fn for_score(potential: f64) -> Self {
        if potential > 0.6 {
            Self::InDepth
        } else {
            Self::Concise
        }
    }

    /// Label used in the prompt.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InDepth => "mendalam",
            Self::Concise => "ringkas",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(Tone, Goal, ResponseStyle);

/// Directive derived from one user message. Ephemeral: never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Raw lexicon score of the message.
    pub sentiment: i32,
    /// Emotional register of the reply.
    pub tone: Tone,
    /// What the reply should achieve.
    pub goal: Goal,
    /// Whether the message carries something worth remembering.
    pub should_remember: bool,
    /// Depth of the reply.
    pub response_style: ResponseStyle,
    /// Whether the reply should end with one open question.
    pub follow_up: bool,
    /// Composite score in `[0, 1]`.
    pub potential_score: f64,
    /// Token budget for the completion.
    pub max_tokens: u32,
}

/// Composite potential score in `[0, 1]`.
#[must_use]
pub fn potential_score(length_chars: usize, sentiment: i32, interaction_count: u32) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let length_score = (length_chars as f64 / LENGTH_SATURATION).min(1.0);
    let emotion_score = (f64::from(sentiment.unsigned_abs()) / EMOTION_SATURATION).min(1.0);
    let interaction_score = (f64::from(interaction_count) / INTERACTION_SATURATION).min(1.0);
    0.4 * length_score + 0.3 * emotion_score + 0.3 * interaction_score
}

/// Whether a reply at this potential should close with a question.
#[must_use]
pub fn wants_follow_up(potential: f64) -> bool {
    potential > 0.5
}

/// Three-step token budget: 320 above 0.65, 220 above 0.4, else 140.
#[must_use]
pub fn token_budget(potential: f64) -> u32 {
    if potential > 0.65 {
        320
    } else if potential > 0.4 {
        220
    } else {
        140
    }
}

/// Whether `text` contains any remember marker (case-insensitive).
#[must_use]
pub fn should_remember(text: &str) -> bool {
    let lower = text.to_lowercase();
    REMEMBER_MARKERS.iter().any(|m| lower.contains(m))
}

/// Analyze a user message.
///
/// `interaction_count` is the number of user turns in this session,
/// including the one being analyzed.
#[must_use]
pub fn analyze(text: &str, interaction_count: u32) -> AnalysisResult {
    let sentiment = lexicon::score(text);
    let potential = potential_score(text.chars().count(), sentiment, interaction_count);

    let result = AnalysisResult {
        sentiment,
        tone: Tone::from_sentiment(sentiment),
        goal: Goal::for_text(text),
        should_remember: should_remember(text),
        response_style: ResponseStyle::for_score(potential),
        follow_up: wants_follow_up(potential),
        potential_score: potential,
        max_tokens: token_budget(potential),
    };

    debug!(
        sentiment,
        potential = result.potential_score,
        tone = %result.tone,
        style = %result.response_style,
        remember = result.should_remember,
        "Analyzed input"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_boundary_is_strict() {
        assert_eq!(ResponseStyle::for_score(0.6), ResponseStyle::Concise);
        assert_eq!(ResponseStyle::for_score(0.6001), ResponseStyle::InDepth);
    }

    #[test]
    fn follow_up_boundary_is_strict() {
        assert!(!wants_follow_up(0.5));
        assert!(wants_follow_up(0.5001));
    }

    #[test]
    fn token_budget_steps() {
        assert_eq!(token_budget(0.0), 140);
        assert_eq!(token_budget(0.4), 140);
        assert_eq!(token_budget(0.41), 220);
        assert_eq!(token_budget(0.65), 220);
        assert_eq!(token_budget(0.66), 320);
        assert_eq!(token_budget(1.0), 320);
    }

    #[test]
    fn potential_score_saturates_at_one() {
        let p = potential_score(500, -9, 99);
        assert!((p - 1.0).abs() < 1e-12);
        assert!(potential_score(0, 0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_neutral_statement() {
        let result = analyze("Halo", 1);
        assert_eq!(result.tone, Tone::Neutral);
        assert_eq!(result.goal, Goal::StructuredResponse);
        assert_eq!(result.response_style, ResponseStyle::Concise);
        assert!(!result.follow_up);
        assert!(!result.should_remember);
        assert_eq!(result.max_tokens, 140);
    }

    #[test]
    fn question_gets_clear_answer_goal() {
        let result = analyze("Kamu bisa bantu apa?", 1);
        assert_eq!(result.goal, Goal::AnswerClearly);
    }

    #[test]
    fn tone_follows_sentiment() {
        assert_eq!(analyze("Aku senang sekali", 1).tone, Tone::Warm);
        assert_eq!(analyze("Aku capek dan bingung", 1).tone, Tone::Soothing);
    }

    #[test]
    fn remember_markers_are_case_insensitive() {
        assert!(analyze("SAYA bekerja di Jakarta", 1).should_remember);
        assert!(analyze("Hobiku berkebun", 1).should_remember);
        assert!(!analyze("Cuaca cerah", 1).should_remember);
    }

    #[test]
    fn long_emotional_message_late_in_session_goes_deep() {
        let text = "Aku sedih, kecewa, dan khawatir karena proyek di kantor terus mundur tanpa kejelasan sama sekali.";
        let result = analyze(text, 12);
        assert!(result.potential_score > 0.65);
        assert_eq!(result.response_style, ResponseStyle::InDepth);
        assert!(result.follow_up);
        assert_eq!(result.max_tokens, 320);
    }
}
