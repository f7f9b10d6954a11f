//! Lexicon Scorer — polarity of a text from fixed word lists.
//!
//! Matching is plain substring search on the lower-cased text, so a lexicon
//! term also counts when it sits inside a longer word ("suka" in "kesukaan").

/// Terms that push the score up by one per occurrence.
pub const POSITIVE_WORDS: &[&str] = &[
    "senang", "bahagia", "suka", "bagus", "mantap", "terima kasih", "puas", "lega",
];

/// Terms that push the score down by one per occurrence.
pub const NEGATIVE_WORDS: &[&str] = &[
    "sedih", "kesal", "marah", "kecewa", "capek", "bingung", "khawatir", "lelah",
];

/// Score the polarity of `text`.
///
/// Adds +1 for every occurrence of a positive term and −1 for every
/// occurrence of a negative term. The result is not clamped; text without
/// any lexicon term scores `0`.
#[must_use]
pub fn score(text: &str) -> i32 {
    let lower = text.to_lowercase();
    let count = |words: &[&str]| -> i32 {
        words
            .iter()
            .map(|w| i32::try_from(lower.matches(w).count()).unwrap_or(i32::MAX))
            .fold(0_i32, i32::saturating_add)
    };
    count(POSITIVE_WORDS).saturating_sub(count(NEGATIVE_WORDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_is_zero() {
        assert_eq!(score(""), 0);
        assert_eq!(score("Hari ini hujan di kota"), 0);
    }

    #[test]
    fn positive_and_negative_terms_cancel() {
        assert_eq!(score("Aku senang tapi juga capek"), 0);
        assert_eq!(score("Terima kasih, aku puas"), 2);
        assert_eq!(score("Aku sedih dan kecewa"), -2);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(score("SENANG sekali"), 1);
    }

    #[test]
    fn every_occurrence_counts() {
        assert_eq!(score("senang, senang, senang"), 3);
    }

    #[test]
    fn substring_matches_inside_words() {
        assert_eq!(score("kesukaan"), 1);
    }
}
