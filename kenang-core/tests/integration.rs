//! Integration Tests — end-to-end memory flows.
//!
//! These tests drive the core pipeline the way a session does:
//! analyze → remember → prompt → record, plus store round-trips.

use chrono::Utc;
use serde_json::json;

use kenang_core::analysis;
use kenang_core::config::PersonaConfig;
use kenang_core::emotion;
use kenang_core::memory::{LongTermMemory, ShortTermBuffer};
use kenang_core::persistence::{JsonFileStore, MemoryStore, SqliteStore};
use kenang_core::prompt;
use kenang_core::types::{Role, SentimentBucket};
use kenang_core::updater;

/// One user turn through analysis and (conditional) memory update.
fn user_turn(memory: &mut LongTermMemory, buffer: &mut ShortTermBuffer, text: &str, count: u32) -> analysis::AnalysisResult {
    buffer.push(Role::User, text);
    let result = analysis::analyze(text, count);
    if result.should_remember {
        updater::remember(memory, text, 6, Utc::now());
    }
    memory.summary = buffer.transcript(6);
    result
}

// ---------------------------------------------------------------------------
// Fact and preference scenarios
// ---------------------------------------------------------------------------

#[test]
fn work_statement_becomes_a_fact() {
    let mut memory = LongTermMemory::new();
    let mut buffer = ShortTermBuffer::default();

    let result = user_turn(&mut memory, &mut buffer, "Saya bekerja di Jakarta", 1);

    assert!(result.should_remember);
    assert_eq!(memory.facts, vec!["Saya bekerja di Jakarta"]);
    assert!(memory.preferences.is_empty());
    assert!(memory.last_updated.is_some());
}

#[test]
fn reading_statement_becomes_a_preference_with_keywords() {
    let mut memory = LongTermMemory::new();
    let mut buffer = ShortTermBuffer::default();

    let result = user_turn(&mut memory, &mut buffer, "Saya suka membaca buku", 1);

    assert!(result.should_remember);
    assert_eq!(memory.preferences, vec!["Saya suka membaca buku"]);
    assert!(memory.facts.is_empty());
    assert!(memory.keywords.iter().any(|k| k == "membaca"));
    assert!(memory.keywords.iter().any(|k| k == "buku"));
    assert!(!memory.keywords.iter().any(|k| k == "saya"));
}

#[test]
fn repeated_statement_is_stored_once() {
    let mut memory = LongTermMemory::new();
    let mut buffer = ShortTermBuffer::default();

    user_turn(&mut memory, &mut buffer, "Aku tinggal di Yogyakarta", 1);
    user_turn(&mut memory, &mut buffer, "Aku tinggal di Yogyakarta", 2);

    assert_eq!(memory.facts.len(), 1);
    let unique: std::collections::HashSet<_> = memory.keywords.iter().collect();
    assert_eq!(unique.len(), memory.keywords.len());
}

#[test]
fn unremarkable_message_leaves_memory_alone() {
    let mut memory = LongTermMemory::new();
    let mut buffer = ShortTermBuffer::default();

    let result = user_turn(&mut memory, &mut buffer, "Cuaca cerah hari ini", 1);

    assert!(!result.should_remember);
    assert!(memory.facts.is_empty() && memory.preferences.is_empty() && memory.keywords.is_empty());
    assert_eq!(memory.summary, "USER: Cuaca cerah hari ini");
}

// ---------------------------------------------------------------------------
// Prompt reflects what was remembered
// ---------------------------------------------------------------------------

#[test]
fn prompt_carries_memory_and_directive() {
    let mut memory = LongTermMemory::new();
    let mut buffer = ShortTermBuffer::default();
    let persona = PersonaConfig::default();

    user_turn(&mut memory, &mut buffer, "Saya bekerja di Jakarta", 1);
    buffer.push(Role::Assistant, "Senang mengenalmu.");
    emotion::record_reply(&mut memory, "Senang mengenalmu.");
    let result = user_turn(&mut memory, &mut buffer, "Hobi aku main gitar, kamu tahu lagu apa?", 2);

    let text = prompt::build(&result, &memory, &buffer, &persona);

    assert!(text.starts_with("SYSTEM: "));
    assert!(text.contains("LONG TERM FACTS: Saya bekerja di Jakarta\n"));
    assert!(text.contains("LONG TERM PREFERENCES: Hobi aku main gitar, kamu tahu lagu apa?\n"));
    assert!(text.contains("KEYWORDS: bekerja, jakarta, hobi, main, gitar"));
    assert!(text.contains("EMOTION PATTERNS: {\"positive\":1}"));
    assert!(text.contains("SHORT TERM: USER: Saya bekerja di Jakarta | ASSISTANT: Senang mengenalmu. | USER: Hobi aku main gitar"));
    assert!(text.contains("Tujuan=menjawab dengan jelas"));
    assert!(text.contains("Mahiru"));
}

#[test]
fn prompt_transcript_is_limited_to_six_entries() {
    let mut buffer = ShortTermBuffer::default();
    for i in 0..9 {
        buffer.push(if i % 2 == 0 { Role::User } else { Role::Assistant }, format!("m{i}"));
    }
    let result = analysis::analyze("m8", 5);
    let text = prompt::build(&result, &LongTermMemory::new(), &buffer, &PersonaConfig::default());

    assert!(text.contains("SHORT TERM: ASSISTANT: m3 | USER: m4 | ASSISTANT: m5 | USER: m6 | ASSISTANT: m7 | USER: m8\n"));
    assert!(!text.contains("m2"));
}

// ---------------------------------------------------------------------------
// Emotion histogram
// ---------------------------------------------------------------------------

#[test]
fn emotion_histogram_tracks_reply_sentiment() {
    let mut memory = LongTermMemory::new();
    for reply in ["Aku senang!", "Semoga tidak sedih lagi.", "Baik.", "Mantap, bagus sekali."] {
        emotion::record_reply(&mut memory, reply);
    }
    assert_eq!(memory.emotion_patterns.get(SentimentBucket::Positive), 2);
    assert_eq!(memory.emotion_patterns.get(SentimentBucket::Negative), 1);
    assert_eq!(memory.emotion_patterns.get(SentimentBucket::Neutral), 1);
    assert_eq!(memory.emotion_patterns.total(), 4);
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[tokio::test]
async fn json_store_creates_defaults_then_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("memory").join("user_memory.json"));

    let first = store.load().await.expect("load").expect("defaults written");
    assert_eq!(LongTermMemory::normalize(&first), LongTermMemory::default());
    assert!(store.path().exists());

    let mut memory = LongTermMemory::new();
    memory.absorb_preference("Aku suka kopi");
    memory.record_emotion(SentimentBucket::Positive);
    store.save(&memory.to_blob()).await.expect("save");

    let loaded = store.load().await.expect("load").expect("present");
    assert_eq!(LongTermMemory::normalize(&loaded), memory);
}

#[tokio::test]
async fn json_store_replaces_corrupt_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("user_memory.json");
    std::fs::write(&path, "{ this is not json").expect("write");

    let store = JsonFileStore::new(&path);
    let loaded = store.load().await.expect("load").expect("defaults");
    assert_eq!(LongTermMemory::normalize(&loaded), LongTermMemory::default());

    let on_disk = std::fs::read_to_string(&path).expect("read");
    assert!(serde_json::from_str::<serde_json::Value>(&on_disk).is_ok());
}

#[tokio::test]
async fn json_store_normalizes_on_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("user_memory.json"));

    store
        .save(&json!({"facts": ["a", "a", 3], "emotion_patterns": {"bored": 1}}))
        .await
        .expect("save");

    let loaded = store.load().await.expect("load").expect("present");
    assert_eq!(loaded["facts"], json!(["a"]));
    assert_eq!(loaded["emotion_patterns"], json!({}));
    assert_eq!(loaded["summary"], json!(""));
}

#[tokio::test]
async fn sqlite_store_keeps_profiles_apart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("kenang.db");

    let rani = SqliteStore::open(&db, "rani", true).expect("open");
    let budi = SqliteStore::open(&db, "budi", true).expect("open");

    let mut memory = LongTermMemory::new();
    memory.absorb_fact("Aku bekerja di Bandung");
    rani.save(&memory.to_blob()).await.expect("save");

    assert!(budi.load().await.expect("load").is_none());
    let loaded = rani.load().await.expect("load").expect("present");
    assert_eq!(LongTermMemory::normalize(&loaded).facts, vec!["Aku bekerja di Bandung"]);
}
