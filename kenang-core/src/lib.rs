//! # Kenang Core Library
//!
//! Memory and prompt-synthesis engine for a conversational companion.
//!
//! Every turn of a dialogue flows through the same pipeline:
//!
//! ```text
//! user text ─► ShortTermBuffer ─► analysis::analyze ─► (updater::remember) ─► prompt::build
//!                                                                            │
//!  persistence ◄── emotion::record ◄── lexicon::score(reply) ◄── backend ◄───┘
//! ```
//!
//! - **Lexicon** — polarity score from fixed word lists
//! - **Keywords** — salient terms ranked by frequency
//! - **Long-term memory** — facts, preferences, keywords, emotion histogram, summary
//! - **Short-term buffer** — the ten most recent turns
//! - **Analysis** — tone, goal, style and token budget for the reply
//! - **Prompt** — the single structured text sent to the completion backend
//!
//! The completion backend and the host UI live outside this crate; the
//! session crate wires them together.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod config;
pub mod emotion;
pub mod error;
pub mod keywords;
pub mod lexicon;
pub mod memory;
pub mod persistence;
pub mod prompt;
pub mod types;
pub mod updater;

pub use analysis::AnalysisResult;
pub use config::KenangConfig;
pub use error::KenangError;
pub use memory::{LongTermMemory, ShortTermBuffer};
pub use types::*;
