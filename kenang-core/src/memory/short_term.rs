//! Short-Term Buffer — bounded, ordered log of recent turns.

use std::collections::VecDeque;

use crate::types::{Role, Turn};

/// Default number of turns kept.
pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 10;

/// FIFO transcript capped at a fixed capacity. Never persisted.
#[derive(Debug, Clone)]
pub struct ShortTermBuffer {
    entries: VecDeque<Turn>,
    capacity: usize,
}

impl Default for ShortTermBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TERM_CAPACITY)
    }
}

impl ShortTermBuffer {
    /// Create an empty buffer holding at most `capacity` turns.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest entries on overflow.
    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push_back(Turn::new(role, text));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Number of turns currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of turns held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All turns, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.entries.iter()
    }

    /// The `n` most recent turns, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Turn> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// The most recent turn.
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.entries.back()
    }

    /// Render the `n` most recent turns as `ROLE: text | ROLE: text`.
    #[must_use]
    pub fn transcript(&self, n: usize) -> String {
        self.recent(n)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
