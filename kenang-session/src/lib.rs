//! # kenang-session — Turn Orchestration for kenang
//!
//! Wires the memory engine in `kenang-core` to a completion backend
//! from `kenang-llm` and to whatever host displays the conversation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                  Host                    │
//! │   submit(text) ──►  Session  ──► RenderSink
//! │                   │        │             │
//! │          kenang-core     kenang-llm      │
//! │      (analysis, memory,  (completion     │
//! │       prompt, stores)     backends)      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `session` — the owned session object and its per-turn pipeline
//! - `state` — the turn state machine
//! - `hooks` — host callbacks (render sink, status values)
//! - `config` — building a session from a `KenangConfig`

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod hooks;
pub mod session;
pub mod state;

pub use config::SetupError;
pub use hooks::{RecordingSink, RenderSink, SessionStatus, SinkEvent};
pub use session::{LoadOutcome, Session, TurnOutcome, TurnReport, FALLBACK_REPLY};
pub use state::SessionState;
