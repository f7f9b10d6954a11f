//! Configuration for the kenang engine.
//!
//! Maps directly to `kenang.toml`. Every field has a default, so an empty
//! file (or no file at all) yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level kenang configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KenangConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Companion persona.
    #[serde(default)]
    pub persona: PersonaConfig,
    /// Short-term buffer and keyword limits.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Completion backend settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Persistence collaborator settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl KenangConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `KenangError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::KenangError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Persona the companion speaks as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Display name, interpolated into the system prompt as `{persona_name}`.
    #[serde(default = "default_persona_name")]
    pub name: String,
    /// System instruction block placed at the top of every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Memory sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum entries kept in the short-term buffer.
    #[serde(default = "default_10")]
    pub short_term_capacity: usize,
    /// Number of recent entries rendered into the summary and prompt.
    #[serde(default = "default_6")]
    pub transcript_window: usize,
    /// Keywords extracted per remembered utterance.
    #[serde(default = "default_6")]
    pub keyword_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: 10,
            transcript_window: 6,
            keyword_limit: 6,
        }
    }
}

/// Completion backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider: "relay", "`llama_cpp`", "none".
    #[serde(default = "default_relay")]
    pub provider: String,
    /// Base URL of the backend.
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Sampling temperature sent with every request.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Stop sequences sent with every request.
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    /// Optional request timeout. Unset means the call may wait indefinitely.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_relay(),
            base_url: default_backend_url(),
            temperature: default_temperature(),
            stop: default_stop(),
            request_timeout_ms: None,
        }
    }
}

/// Persistence collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "json", "sqlite" or "memory".
    #[serde(default = "default_json")]
    pub backend: String,
    /// File path of the JSON blob or SQLite database.
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,
    /// Row key for the SQLite backend.
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Detect save corruption via checksums (SQLite only).
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: default_json(),
            path: default_memory_path(),
            profile: default_profile(),
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

/// Persona text of the default companion.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Kamu adalah companion AI bernama {persona_name}: tenang, cerdas, perhatian, dan praktis. Kamu tidak genit, tidak romantis, tidak menggoda, dan tidak mengklaim kepemilikan user. Jawaban harus rapi, lembut tapi tegas, fokus membantu dan menemani berpikir. Jika informasi tidak jelas, minta klarifikasi. Jangan mengada-ada. Gunakan memori percakapan untuk konsistensi, tetapi jangan menyebut sistem internal.";

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_persona_name() -> String { "Mahiru".to_string() }
fn default_system_prompt() -> String { DEFAULT_SYSTEM_PROMPT.to_string() }
fn default_relay() -> String { "relay".to_string() }
fn default_backend_url() -> String { "http://127.0.0.1:8081".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_stop() -> Vec<String> { vec!["USER:".to_string(), "SYSTEM:".to_string()] }
fn default_json() -> String { "json".to_string() }
fn default_memory_path() -> PathBuf { PathBuf::from("memory/user_memory.json") }
fn default_profile() -> String { "default".to_string() }
fn default_6() -> usize { 6 }
fn default_10() -> usize { 10 }
