//! # kenang-llm — Completion Backend Adapters
//!
//! The companion engine never talks HTTP itself. It hands a
//! [`CompletionRequest`] to anything implementing [`CompletionBackend`] and
//! gets back a [`CompletionReply`] or an [`LlmError`]. This crate provides
//! the HTTP adapters:
//!
//!   - **Relay** — a thin local server exposing `POST /api/chat` with the
//!     request body as-is and answering `{ "reply": ... }`
//!   - **llama.cpp** — the `POST /completion` endpoint of `llama-server`
//!   - **None** — every call fails, so the session falls back immediately
//!
//! Any failure (transport error, non-success status, unreadable body) is
//! surfaced as an `Err`; the caller treats them all as "backend unavailable".
//! There are no retries.

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendProvider, CompletionBackend, HttpCompletionClient};
pub use error::LlmError;
pub use types::{CompletionReply, CompletionRequest};
