//! Request and reply shapes shared by every backend.

use serde::{Deserialize, Serialize};

/// One completion request.
///
/// Serializes to exactly the relay wire body:
/// `{prompt, message, max_tokens, temperature, stop}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Full synthesized prompt.
    pub prompt: String,
    /// The raw user message this turn answers.
    pub message: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Stop sequences.
    pub stop: Vec<String>,
}

impl CompletionRequest {
    /// Request with the default sampling settings (`0.7`, stop on `USER:` and `SYSTEM:`).
    #[must_use]
    pub fn new(prompt: impl Into<String>, message: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            message: message.into(),
            max_tokens,
            temperature: 0.7,
            stop: vec!["USER:".to_string(), "SYSTEM:".to_string()],
        }
    }

    /// Set the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the stop sequences.
    #[must_use]
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    /// Prompt text for raw completion endpoints, which have no separate
    /// message field: the user turn is appended and the assistant cued.
    #[must_use]
    pub fn raw_prompt(&self) -> String {
        format!("{}\nUSER: {}\nASSISTANT:", self.prompt, self.message)
    }
}

/// A backend's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReply {
    /// Generated text.
    pub reply: String,
}

impl CompletionReply {
    /// Wrap generated text.
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}
