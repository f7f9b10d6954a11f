//! Completion Client — relay and llama.cpp backends behind one trait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::types::{CompletionReply, CompletionRequest};

/// Text used when a llama.cpp server answers without any content.
pub const EMPTY_COMPLETION: &str = "(Tidak ada jawaban)";

/// Anything that can turn a prompt into a reply.
///
/// The session only ever sees this trait, so tests and alternative hosts can
/// plug in their own backend without touching the engine.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Ask for one completion.
    ///
    /// # Errors
    /// Any failure at all. The caller does not distinguish between them.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply>;

    /// Whether a real backend is configured.
    fn is_available(&self) -> bool {
        true
    }
}

/// Provider backend for completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendProvider {
    /// Local relay server: `POST {base_url}/api/chat`, answers `{reply}`.
    Relay {
        /// Base URL, e.g. `http://127.0.0.1:8081`.
        base_url: String,
    },
    /// llama.cpp `llama-server`: `POST {base_url}/completion`.
    LlamaCpp {
        /// Base URL, e.g. `http://127.0.0.1:8081`.
        base_url: String,
    },
    /// No backend: every call fails with [`LlmError::Unavailable`].
    None,
}

impl BackendProvider {
    /// Resolve a provider from its configuration name
    /// (`"relay"`, `"llama_cpp"` or `"none"`).
    ///
    /// # Errors
    /// Returns [`LlmError::ConfigError`] for any other name.
    pub fn from_name(name: &str, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match name {
            "relay" => Ok(Self::Relay { base_url }),
            "llama_cpp" | "llamacpp" | "llama.cpp" => Ok(Self::LlamaCpp { base_url }),
            "none" => Ok(Self::None),
            other => Err(LlmError::ConfigError(format!(
                "unknown backend provider '{other}' (expected relay, llama_cpp or none)"
            ))),
        }
    }
}

/// HTTP client that routes requests to the configured provider.
pub struct HttpCompletionClient {
    provider: BackendProvider,
    http: Client,
    timeout: Option<Duration>,
}

impl HttpCompletionClient {
    /// Create a client. Requests have no timeout unless one is set.
    #[must_use]
    pub fn new(provider: BackendProvider) -> Self {
        Self {
            provider,
            http: Client::new(),
            timeout: None,
        }
    }

    /// Create a client with no backend (all calls fail → fallback reply).
    #[must_use]
    pub fn none() -> Self {
        Self::new(BackendProvider::None)
    }

    /// Abort requests that take longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured provider.
    #[must_use]
    pub fn provider(&self) -> &BackendProvider {
        &self.provider
    }

    /// Complete via the relay's `/api/chat`.
    async fn complete_relay(&self, base_url: &str, request: &CompletionRequest) -> Result<CompletionReply> {
        let url = format!("{base_url}/api/chat");
        let body = serde_json::to_value(request).map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let json = self.post_json(&url, &body).await?;
        json["reply"]
            .as_str()
            .map(CompletionReply::new)
            .ok_or_else(|| LlmError::ParseError(format!("relay response has no 'reply' string: {json}")))
    }

    /// Complete via llama.cpp's `/completion`.
    async fn complete_llama_cpp(&self, base_url: &str, request: &CompletionRequest) -> Result<CompletionReply> {
        let url = format!("{base_url}/completion");
        let body = json!({
            "prompt": request.raw_prompt(),
            "n_predict": request.max_tokens,
            "temperature": request.temperature,
            "stop": request.stop,
        });

        let json = self.post_json(&url, &body).await?;
        let text = ["content", "reply"]
            .iter()
            .filter_map(|field| json[*field].as_str())
            .find(|s| !s.is_empty())
            .unwrap_or(EMPTY_COMPLETION);
        Ok(CompletionReply::new(text))
    }

    /// POST `body` and return the decoded JSON of a successful response.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let mut builder = self.http.post(url).json(body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let start = Instant::now();
        let resp = builder.send().await.map_err(|e| self.transport_error(url, e))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), latency_ms, "Completion backend returned error");
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        debug!(url, latency_ms, "Completion received");
        Ok(json)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            let ms = self
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
            warn!(url, timeout_ms = ms, "Completion request timed out");
            LlmError::Timeout(ms)
        } else {
            warn!(url, error = %err, "Completion request failed");
            err.into()
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply> {
        match &self.provider {
            BackendProvider::None => Err(LlmError::Unavailable("No completion backend configured".into())),
            BackendProvider::Relay { base_url } => self.complete_relay(base_url, request).await,
            BackendProvider::LlamaCpp { base_url } => self.complete_llama_cpp(base_url, request).await,
        }
    }

    fn is_available(&self) -> bool {
        !matches!(self.provider, BackendProvider::None)
    }
}
