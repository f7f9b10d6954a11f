//! The companion session: one owned conversation and its per-turn pipeline.
//!
//! A [`Session`] owns its long-term memory, short-term buffer and interaction
//! counter. [`Session::submit`] takes `&mut self`, so two turns can never run
//! against the same memory at once. Hosts that accept input while a turn is
//! in flight must queue it themselves.
//!
//! Memory changes derived from the user's message are staged on a copy and
//! only committed once the backend has replied. A failed turn leaves
//! long-term memory exactly as it was; the short-term buffer keeps the user's
//! message but gets no assistant entry.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use kenang_core::analysis::{self, AnalysisResult};
use kenang_core::config::KenangConfig;
use kenang_core::emotion::{self, Expression};
use kenang_core::memory::{LongTermMemory, ShortTermBuffer};
use kenang_core::persistence::MemoryStore;
use kenang_core::prompt;
use kenang_core::types::{Role, SentimentBucket, SessionId};
use kenang_core::updater::{self, MemoryUpdate};
use kenang_llm::{CompletionBackend, CompletionRequest};

use crate::hooks::{RenderSink, SessionStatus};
use crate::state::SessionState;

/// Shown in place of the assistant's reply when the backend fails.
pub const FALLBACK_REPLY: &str = "Aku belum bisa menjangkau model lokal. Pastikan server inference berjalan.";

/// Result of [`Session::load_memory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored blob was found and normalized.
    Loaded,
    /// Nothing stored yet; starting from defaults.
    Empty,
    /// The store failed; running on defaults until the next successful save.
    Failed,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The backend replied and memory was committed.
    Completed {
        /// Sentiment bucket of the reply.
        reply_sentiment: SentimentBucket,
        /// Whether the save afterwards succeeded.
        saved: bool,
    },
    /// The backend failed; the fallback reply was shown.
    BackendUnavailable {
        /// What went wrong, for logs.
        error: String,
    },
}

/// Everything a host may want to know about a finished turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Trimmed user message.
    pub input: String,
    /// The directive derived from it.
    pub analysis: AnalysisResult,
    /// The prompt sent to the backend.
    pub prompt: String,
    /// The reply shown to the user (the fallback on failure).
    pub reply: String,
    /// How the turn ended.
    pub outcome: TurnOutcome,
    /// Committed memory changes. Empty when the backend failed.
    pub update: MemoryUpdate,
    /// States visited, starting and ending with `Idle`.
    pub path: Vec<SessionState>,
}

impl TurnReport {
    /// Whether the backend replied.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, TurnOutcome::Completed { .. })
    }
}

/// One conversation with the companion.
pub struct Session {
    id: SessionId,
    config: KenangConfig,
    memory: LongTermMemory,
    short_term: ShortTermBuffer,
    interactions: u32,
    state: SessionState,
    backend: Arc<dyn CompletionBackend>,
    store: Arc<dyn MemoryStore>,
    sink: Arc<dyn RenderSink>,
}

impl Session {
    /// Create a session with empty memory. Call [`Session::load_memory`]
    /// before the first turn to pick up stored memory.
    #[must_use]
    pub fn new(
        config: KenangConfig,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn MemoryStore>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        let short_term = ShortTermBuffer::new(config.memory.short_term_capacity);
        let id = SessionId::new();
        info!(session = %id, store = %store.describe(), "Session created");
        Self {
            id,
            config,
            memory: LongTermMemory::new(),
            short_term,
            interactions: 0,
            state: SessionState::Idle,
            backend,
            store,
            sink,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current state. `Idle` between turns; a turn whose future was dropped
    /// mid-flight leaves its last state here until the next `submit`.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Committed long-term memory.
    #[must_use]
    pub fn memory(&self) -> &LongTermMemory {
        &self.memory
    }

    /// Recent turns.
    #[must_use]
    pub fn short_term(&self) -> &ShortTermBuffer {
        &self.short_term
    }

    /// Number of user turns submitted so far.
    #[must_use]
    pub fn interaction_count(&self) -> u32 {
        self.interactions
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &KenangConfig {
        &self.config
    }

    /// Replace long-term memory with whatever the store holds.
    ///
    /// Never fails: a store error is reported to the host as
    /// [`SessionStatus::MemoryLoadCorrupt`] and the session runs on defaults.
    pub async fn load_memory(&mut self) -> LoadOutcome {
        let outcome = match self.store.load().await {
            Ok(Some(blob)) => {
                self.memory = LongTermMemory::normalize(&blob);
                info!(
                    session = %self.id,
                    facts = self.memory.facts.len(),
                    preferences = self.memory.preferences.len(),
                    keywords = self.memory.keywords.len(),
                    "Long-term memory loaded"
                );
                LoadOutcome::Loaded
            }
            Ok(None) => {
                self.memory = LongTermMemory::new();
                LoadOutcome::Empty
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Memory load failed, using defaults");
                self.memory = LongTermMemory::new();
                self.sink.status(SessionStatus::MemoryLoadCorrupt);
                LoadOutcome::Failed
            }
        };
        self.sink.expression(Expression::Idle);
        outcome
    }

    /// Run one turn for `text`.
    ///
    /// Returns `None` (and changes nothing) when `text` is empty after
    /// trimming. Backend and save failures are reported through the sink and
    /// in the returned report; they are never errors.
    pub async fn submit(&mut self, text: &str) -> Option<TurnReport> {
        let input = text.trim();
        if input.is_empty() {
            return None;
        }
        if self.state != SessionState::Idle {
            warn!(session = %self.id, state = %self.state, "Previous turn was dropped mid-flight, resetting to idle");
            self.state = SessionState::Idle;
        }

        let mut path = vec![self.state];
        self.sink.expression(Expression::Talk);
        self.sink.render(Role::User, input);
        self.short_term.push(Role::User, input);
        self.interactions = self.interactions.saturating_add(1);

        self.advance(SessionState::Analyzing, &mut path);
        let analysis = analysis::analyze(input, self.interactions);

        let mut staged = self.memory.clone();
        let mut update = MemoryUpdate::default();
        if analysis.should_remember {
            self.advance(SessionState::Remembering, &mut path);
            update = updater::remember(&mut staged, input, self.config.memory.keyword_limit, Utc::now());
        }

        let window = self.config.memory.transcript_window;
        staged.summary = self.short_term.transcript(window);

        self.advance(SessionState::Prompting, &mut path);
        let prompt = prompt::build_with_window(&analysis, &staged, &self.short_term, &self.config.persona, window);
        let request = CompletionRequest::new(prompt.as_str(), input, analysis.max_tokens)
            .with_temperature(self.config.backend.temperature)
            .with_stop(self.config.backend.stop.clone());

        self.advance(SessionState::AwaitingReply, &mut path);
        self.sink.status(SessionStatus::Sending);

        match self.backend.complete(&request).await {
            Ok(completion) => {
                self.advance(SessionState::Recording, &mut path);
                let reply = completion.reply;

                self.memory = staged;
                self.sink.render(Role::Assistant, &reply);
                self.short_term.push(Role::Assistant, reply.as_str());
                let bucket = emotion::record_reply(&mut self.memory, &reply);
                self.sink.expression(Expression::from(bucket));

                let saved = self.save().await;
                if saved {
                    self.sink.status(SessionStatus::Ready);
                }
                self.advance(SessionState::Idle, &mut path);

                Some(TurnReport {
                    input: input.to_string(),
                    analysis,
                    prompt,
                    reply,
                    outcome: TurnOutcome::Completed {
                        reply_sentiment: bucket,
                        saved,
                    },
                    update,
                    path,
                })
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Completion backend unavailable, using fallback reply");
                self.sink.render(Role::Assistant, FALLBACK_REPLY);
                self.sink.expression(Expression::Idle);
                self.sink.status(SessionStatus::BackendUnavailable);
                self.advance(SessionState::Idle, &mut path);

                Some(TurnReport {
                    input: input.to_string(),
                    analysis,
                    prompt,
                    reply: FALLBACK_REPLY.to_string(),
                    outcome: TurnOutcome::BackendUnavailable { error: e.to_string() },
                    update: MemoryUpdate::default(),
                    path,
                })
            }
        }
    }

    /// Write committed memory to the store.
    ///
    /// Returns `false` and reports [`SessionStatus::MemorySaveFailed`] on
    /// failure. Memory stays in the session, so the next save carries it.
    pub async fn save(&self) -> bool {
        match self.store.save(&self.memory.to_blob()).await {
            Ok(()) => {
                debug!(session = %self.id, "Long-term memory saved");
                true
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Memory save failed");
                self.sink.status(SessionStatus::MemorySaveFailed);
                false
            }
        }
    }

    fn advance(&mut self, next: SessionState, path: &mut Vec<SessionState>) {
        if !self.state.can_transition_to(next) {
            warn!(session = %self.id, from = %self.state, to = %next, "Unexpected state transition");
        }
        debug!(session = %self.id, from = %self.state, to = %next, "State transition");
        self.state = next;
        path.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use kenang_core::persistence::InMemoryStore;
    use kenang_llm::{CompletionReply, LlmError};

    use crate::hooks::RecordingSink;

    struct Echo;

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, LlmError> {
            Ok(CompletionReply::new(format!("Kamu bilang: {}", request.message)))
        }
    }

    fn session() -> (Session, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = Session::new(
            KenangConfig::default(),
            Arc::new(Echo),
            Arc::new(InMemoryStore::new()),
            sink.clone(),
        );
        (session, sink)
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (mut session, sink) = session();
        assert!(session.submit("   \n\t").await.is_none());
        assert_eq!(session.interaction_count(), 0);
        assert!(session.short_term().is_empty());
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed() {
        let (mut session, _sink) = session();
        let report = session.submit("  Halo  ").await.expect("turn");
        assert_eq!(report.input, "Halo");
        assert_eq!(report.reply, "Kamu bilang: Halo");
        assert_eq!(session.short_term().iter().next().map(|t| t.text.as_str()), Some("Halo"));
    }

    #[tokio::test]
    async fn path_skips_remembering_for_small_talk() {
        let (mut session, _sink) = session();
        let report = session.submit("Halo").await.expect("turn");
        assert_eq!(
            report.path,
            vec![
                SessionState::Idle,
                SessionState::Analyzing,
                SessionState::Prompting,
                SessionState::AwaitingReply,
                SessionState::Recording,
                SessionState::Idle,
            ]
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn counter_includes_current_turn() {
        let (mut session, _sink) = session();
        session.submit("satu").await;
        let report = session.submit("dua").await.expect("turn");
        assert_eq!(session.interaction_count(), 2);
        let expected = analysis::potential_score(3, 0, 2);
        assert!((report.analysis.potential_score - expected).abs() < f64::EPSILON);
    }
}
