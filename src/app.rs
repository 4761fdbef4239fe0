//! Application context
//!
//! `GemHook` owns everything an invocation needs: settings and where they
//! persist, the vault, the notification surface and the booted model
//! client. Host capabilities are injected at construction.

use crate::command::block::{HyperBlock, OutputSink};
use crate::command::executor::{
    HyperCommandExecutor, HyperCommandRequest, HyperCommandResult, Notifier,
};
use crate::command::scanner;
use crate::core::config::{Settings, SettingsStore, API_KEY_ENV};
use crate::core::error::{GemHookError, Result};
use crate::llm::client::{GeminiClient, ModelClient};
use crate::vault::DocumentStore;

/// Notification raised by every boot
pub const BOOT_NOTICE: &str = "⚡ ZEUS ONLINE – PRE-AGENTIVE FLOW ACTIVE";

/// Builds the model client at boot from the settings and credential
pub type ClientFactory = Box<dyn Fn(&Settings, &str) -> Box<dyn ModelClient> + Send + Sync>;

fn gemini_factory() -> ClientFactory {
    Box::new(|settings: &Settings, credential: &str| -> Box<dyn ModelClient> {
        Box::new(
            GeminiClient::new(credential.to_string(), settings.model.clone())
                .with_timeout(settings.request_timeout_secs),
        )
    })
}

pub struct GemHook {
    settings: Settings,
    env_api_key: Option<String>,
    store: Box<dyn SettingsStore>,
    documents: Box<dyn DocumentStore>,
    notifier: Box<dyn Notifier>,
    client_factory: ClientFactory,
    client: Option<Box<dyn ModelClient>>,
}

impl GemHook {
    /// Load settings; the model client is not booted yet
    pub fn load(
        store: Box<dyn SettingsStore>,
        documents: Box<dyn DocumentStore>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let settings = store.load()?;
        Ok(Self {
            settings,
            env_api_key: std::env::var(API_KEY_ENV).ok(),
            store,
            documents,
            notifier,
            client_factory: gemini_factory(),
            client: None,
        })
    }

    /// Replace the credential taken from the environment
    pub fn with_env_api_key(mut self, key: Option<String>) -> Self {
        self.env_api_key = key;
        self
    }

    /// Replace how the model client is built at boot
    pub fn with_client_factory(mut self, factory: ClientFactory) -> Self {
        self.client_factory = factory;
        self
    }

    /// Boot if the settings ask for it
    pub fn activate(&mut self) {
        if self.settings.auto_boot {
            self.boot();
        } else {
            tracing::info!("auto boot disabled, model client not constructed");
        }
    }

    /// Announce readiness and construct the model client when a credential exists
    pub fn boot(&mut self) {
        self.notifier.notify(BOOT_NOTICE);

        let credential = self.credential().to_string();
        if credential.is_empty() {
            tracing::warn!("no API key configured, model client not constructed");
            return;
        }
        self.client = Some((self.client_factory)(&self.settings, &credential));
        tracing::info!(model = %self.settings.model, "model client ready");
    }

    pub fn is_booted(&self) -> bool {
        self.client.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Stored API key, or the environment key when none is stored
    ///
    /// With `GEMHOOK_API_KEY` set, an empty stored key no longer means
    /// "not configured": requests reach the network on the env key.
    pub fn credential(&self) -> &str {
        if self.settings.api_key.is_empty() {
            self.env_api_key.as_deref().unwrap_or_default()
        } else {
            &self.settings.api_key
        }
    }

    /// Apply one settings-form edit and persist the result
    ///
    /// An edit that fails validation is neither saved nor applied. A booted
    /// client keeps its old credential until the next boot.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut Settings)) -> Result<()> {
        let mut edited = self.settings.clone();
        edit(&mut edited);
        edited.validate().map_err(GemHookError::Settings)?;

        self.store.save(&edited)?;
        self.settings = edited;
        Ok(())
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        self.update_settings(|s| s.api_key = key)
    }

    pub fn executor(&self) -> HyperCommandExecutor<'_> {
        HyperCommandExecutor::new(
            &self.settings,
            self.client.as_deref(),
            self.documents.as_ref(),
            self.notifier.as_ref(),
        )
    }

    pub async fn execute(&self, request: &HyperCommandRequest) -> HyperCommandResult {
        self.executor().execute(request, self.credential()).await
    }

    /// Press the run button of a rendered block
    pub async fn run_block<S: OutputSink>(&self, block: &HyperBlock<S>) -> HyperCommandResult {
        block.run(&self.executor(), self.credential()).await
    }

    /// Locate the last block of a note and announce it; nothing is executed
    pub fn run_last_block(&self, content: &str) -> Option<String> {
        scanner::run_last_block(content, self.notifier.as_ref())
    }
}
