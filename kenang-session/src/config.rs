//! Building a session from a [`KenangConfig`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use kenang_core::config::{BackendConfig, KenangConfig};
use kenang_core::persistence;
use kenang_core::KenangError;
use kenang_llm::{BackendProvider, CompletionBackend, HttpCompletionClient, LlmError};

use crate::hooks::{RenderSink, SessionStatus};
use crate::session::Session;

/// Errors raised while wiring a session. Nothing after setup is fatal.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The persistence store could not be opened.
    #[error("failed to open memory store: {0}")]
    Store(#[from] KenangError),

    /// The backend section names an unknown provider.
    #[error("failed to configure completion backend: {0}")]
    Backend(#[from] LlmError),
}

/// Build the HTTP completion client described by `[backend]`.
///
/// # Errors
/// Returns [`LlmError::ConfigError`] for an unknown provider name.
pub fn connect_backend(config: &BackendConfig) -> Result<HttpCompletionClient, LlmError> {
    let provider = BackendProvider::from_name(&config.provider, config.base_url.as_str())?;
    let mut client = HttpCompletionClient::new(provider);
    if let Some(ms) = config.request_timeout_ms {
        client = client.with_timeout(Duration::from_millis(ms));
    }
    info!(provider = %config.provider, base_url = %config.base_url, "Completion backend configured");
    Ok(client)
}

impl Session {
    /// Open the configured store and backend and create a session.
    ///
    /// Stored memory is not read yet; call [`Session::load_memory`]. A
    /// backend that is not configured is reported to the host as
    /// [`SessionStatus::BackendUnavailable`] before the first turn.
    ///
    /// # Errors
    /// Returns [`SetupError`] if the store cannot be opened or the backend
    /// provider is unknown.
    pub fn from_config(config: KenangConfig, sink: Arc<dyn RenderSink>) -> Result<Self, SetupError> {
        let backend = connect_backend(&config.backend)?;
        let store = persistence::open_store(&config.persistence)?;
        if !backend.is_available() {
            warn!("No completion backend configured, every turn will use the fallback reply");
            sink.status(SessionStatus::BackendUnavailable);
        }
        Ok(Self::new(config, Arc::new(backend), Arc::from(store), sink))
    }
}
