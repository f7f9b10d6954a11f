//! Host callbacks.
//!
//! The session never prints anything itself. Every message, status line and
//! expression change goes through a [`RenderSink`] supplied by the host.

use std::fmt;

use parking_lot::Mutex;

use kenang_core::emotion::Expression;
use kenang_core::types::Role;

/// Non-fatal session status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// A completion request is in flight.
    Sending,
    /// The turn finished and memory was saved.
    Ready,
    /// The completion backend failed; the fallback reply was shown.
    BackendUnavailable,
    /// Stored memory could not be loaded; running on defaults.
    MemoryLoadCorrupt,
    /// Memory could not be saved; it stays in the session for the next save.
    MemorySaveFailed,
}

impl SessionStatus {
    /// Text displayed to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Sending => "Mengirim ke model lokal...",
            Self::Ready => "Siap.",
            Self::BackendUnavailable => "Model lokal belum siap.",
            Self::MemoryLoadCorrupt => "Memori lokal tidak bisa dimuat. Menggunakan memori sementara.",
            Self::MemorySaveFailed => "Memori lokal belum tersimpan.",
        }
    }

    /// Whether this status reports a failure.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::BackendUnavailable | Self::MemoryLoadCorrupt | Self::MemorySaveFailed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Where a session sends everything the user should see.
pub trait RenderSink: Send + Sync {
    /// Display one message.
    fn render(&self, role: Role, text: &str);

    /// Replace the status line.
    fn status(&self, status: SessionStatus);

    /// Change the companion's expression. Hosts without an avatar ignore it.
    fn expression(&self, _expression: Expression) {}
}

/// One callback received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// `render(role, text)`.
    Render(Role, String),
    /// `status(status)`.
    Status(SessionStatus),
    /// `expression(expression)`.
    Expression(Expression),
}

/// Sink that keeps every callback in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event so far.
    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Rendered messages, in order.
    #[must_use]
    pub fn rendered(&self) -> Vec<(Role, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Render(role, text) => Some((*role, text.clone())),
                _ => None,
            })
            .collect()
    }

    /// Statuses, in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<SessionStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Status(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Most recent status.
    #[must_use]
    pub fn last_status(&self) -> Option<SessionStatus> {
        self.statuses().last().copied()
    }

    /// Expressions, in order.
    #[must_use]
    pub fn expressions(&self) -> Vec<Expression> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Expression(x) => Some(*x),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl RenderSink for RecordingSink {
    fn render(&self, role: Role, text: &str) {
        self.events.lock().push(SinkEvent::Render(role, text.to_string()));
    }

    fn status(&self, status: SessionStatus) {
        self.events.lock().push(SinkEvent::Status(status));
    }

    fn expression(&self, expression: Expression) {
        self.events.lock().push(SinkEvent::Expression(expression));
    }
}
