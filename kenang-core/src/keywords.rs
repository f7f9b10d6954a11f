//! Keyword Extractor — salient terms of a text ranked by frequency.

use std::collections::HashMap;

/// Tokens shorter than or equal to this many characters are discarded.
pub const MIN_TOKEN_CHARS: usize = 3;

/// Function words never treated as keywords (Indonesian, plus the common
/// English words users mix in).
pub const STOP_WORDS: &[&str] = &[
    // Indonesian
    "saya", "kamu", "anda", "dia", "kami", "kita", "mereka", "yang", "dengan",
    "untuk", "dari", "pada", "dalam", "karena", "tetapi", "tapi", "atau",
    "juga", "sudah", "belum", "akan", "bisa", "dapat", "tidak", "bukan",
    "adalah", "ialah", "seperti", "sangat", "lebih", "sama", "saja", "hanya",
    "masih", "harus", "kalau", "jika", "agar", "supaya", "ketika", "bahwa",
    "oleh", "bagi", "para", "telah", "sedang", "lagi", "banyak", "semua",
    "tentang", "apakah", "bagaimana", "kenapa", "mengapa", "dimana", "kapan",
    "sini", "situ", "sana", "begitu", "sekali", "nya", "kok", "deh", "dong",
    // English
    "this", "that", "these", "those", "with", "from", "have", "been", "were",
    "what", "when", "where", "your", "about", "there", "their", "would",
    "could", "should", "which",
];

/// Whether `token` is a stop-word.
#[must_use]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split `text` into lower-cased alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Extract at most `limit` keywords from `text`.
///
/// Tokens of [`MIN_TOKEN_CHARS`] characters or fewer and stop-words are
/// dropped. The rest are ranked by descending frequency; ties keep the order
/// in which the tokens first appeared, so the output is deterministic.
#[must_use]
pub fn extract(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for token in tokenize(text) {
        if token.chars().count() <= MIN_TOKEN_CHARS || is_stop_word(&token) {
            continue;
        }
        if let Some(&slot) = index.get(&token) {
            counts[slot].1 += 1;
        } else {
            index.insert(token.clone(), counts.len());
            counts.push((token, 1));
        }
    }

    // `sort_by` is stable, which preserves first-seen order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts.into_iter().map(|(token, _)| token).collect()
}
