//! Hyper-Command execution
//!
//! One invocation: resolve the system prompt from the context document (or
//! the persona fallback), send `[system_prompt, block_text]` to the model and
//! turn whatever happens into a [`HyperCommandResult`]. Nothing escapes as an
//! error; failures become display text.
//!
//! There is no retry and no cancellation. Unless the settings carry a
//! request timeout, a model call that never settles leaves the caller
//! waiting indefinitely.

use crate::core::config::Settings;
use crate::core::error::{GemHookError, ModelError, Result};
use crate::llm::client::ModelClient;
use crate::vault::DocumentStore;

/// Prefix put in front of every execution failure
pub const WARNING_PREFIX: &str = "VW_Warning: ";

/// Notification raised after a successful execution
pub const SUCCESS_NOTICE: &str = "Hyper-Command executed – Muses Voice rendered";

/// Transient, fire-and-forget notifications shown to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Input for a single execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperCommandRequest {
    /// Raw text of the Hyper-Command block
    pub block_text: String,
    /// Vault-relative context document overriding the configured one
    pub context_document: Option<String>,
}

impl HyperCommandRequest {
    pub fn new(block_text: impl Into<String>) -> Self {
        Self {
            block_text: block_text.into(),
            context_document: None,
        }
    }

    pub fn with_context_document(mut self, path: impl Into<String>) -> Self {
        self.context_document = Some(path.into());
        self
    }
}

/// Outcome of a single execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperCommandResult {
    Success { text: String },
    Failure { message: String },
}

impl HyperCommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The string the output area should show
    pub fn text_for_display(&self) -> &str {
        match self {
            Self::Success { text } => text,
            Self::Failure { message } => message,
        }
    }
}

/// Executes Hyper-Command requests against a model client
pub struct HyperCommandExecutor<'a> {
    client: Option<&'a dyn ModelClient>,
    documents: &'a dyn DocumentStore,
    notifier: &'a dyn Notifier,
    context_path: &'a str,
    fallback_prompt: String,
}

impl<'a> HyperCommandExecutor<'a> {
    /// `client` is `None` until the model client has been booted
    pub fn new(
        settings: &'a Settings,
        client: Option<&'a dyn ModelClient>,
        documents: &'a dyn DocumentStore,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            client,
            documents,
            notifier,
            context_path: &settings.context_path,
            fallback_prompt: settings.fallback_prompt(),
        }
    }

    /// Run one request
    ///
    /// An empty `credential` fails with `not configured` before any lookup
    /// or network traffic. Success raises exactly one notification; failures
    /// raise none.
    pub async fn execute(
        &self,
        request: &HyperCommandRequest,
        credential: &str,
    ) -> HyperCommandResult {
        if credential.is_empty() {
            tracing::debug!("hyper-command rejected: no credential");
            return HyperCommandResult::Failure {
                message: GemHookError::NotConfigured.to_string(),
            };
        }

        match self.try_execute(request).await {
            Ok(text) => {
                self.notifier.notify(SUCCESS_NOTICE);
                HyperCommandResult::Success { text }
            }
            Err(e) => {
                tracing::warn!(error = %e, "hyper-command failed");
                HyperCommandResult::Failure {
                    message: format!("{}{}", WARNING_PREFIX, e),
                }
            }
        }
    }

    async fn try_execute(&self, request: &HyperCommandRequest) -> Result<String> {
        let client = self.client.ok_or(ModelError::Unavailable)?;
        let system_prompt = self.resolve_system_prompt(request)?;

        tracing::info!(
            block_len = request.block_text.len(),
            prompt_len = system_prompt.len(),
            "executing hyper-command"
        );

        client
            .generate(&system_prompt, &request.block_text)
            .await
            .map_err(GemHookError::from)
    }

    /// Context document text verbatim, or the persona fallback
    fn resolve_system_prompt(&self, request: &HyperCommandRequest) -> Result<String> {
        let path = request
            .context_document
            .as_deref()
            .unwrap_or(self.context_path);

        Ok(self
            .documents
            .lookup(path)?
            .unwrap_or_else(|| self.fallback_prompt.clone()))
    }
}
