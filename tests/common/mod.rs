//! Substitute host capabilities shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gemhook::command::executor::Notifier;
use gemhook::core::config::{Settings, SettingsStore};
use gemhook::core::error::{GemHookError, ModelError, Result};
use gemhook::llm::client::ModelClient;
use gemhook::vault::DocumentStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Model client that records every payload and replays a scripted answer
#[derive(Clone)]
pub struct RecordingClient {
    response: std::result::Result<String, ModelError>,
    payloads: Arc<Mutex<Vec<[String; 2]>>>,
    calls: Arc<AtomicUsize>,
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClient {
    pub fn replying(text: &str) -> Self {
        Self::with_response(Ok(text.to_string()))
    }

    pub fn failing(error: ModelError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: std::result::Result<String, ModelError>) -> Self {
        Self {
            response,
            payloads: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            delays: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay the n-th call (in call order) by the n-th duration
    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<[String; 2]> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for RecordingClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> std::result::Result<String, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .unwrap()
            .push([system_prompt.to_string(), user_text.to_string()]);

        let (delay, tagged) = {
            let delays = self.delays.lock().unwrap();
            (delays.get(call).copied(), !delays.is_empty())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        // Delayed clients tag each answer with its call number so races are observable.
        self.response.clone().map(|text| {
            if tagged {
                format!("{} #{}", text, call + 1)
            } else {
                text
            }
        })
    }
}

/// In-memory vault
#[derive(Default)]
pub struct MemoryDocs {
    docs: HashMap<String, String>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryDocs {
    pub fn with(mut self, path: &str, text: &str) -> Self {
        self.docs.insert(path.to_string(), text.to_string());
        self
    }

    pub fn lookup_counter(&self) -> Arc<AtomicUsize> {
        self.lookups.clone()
    }
}

impl DocumentStore for MemoryDocs {
    fn lookup(&self, path: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.docs.get(path).cloned())
    }
}

/// Vault whose documents all exist but cannot be read
#[derive(Default)]
pub struct FailingDocs {
    lookups: Arc<AtomicUsize>,
}

impl FailingDocs {
    pub fn lookup_counter(&self) -> Arc<AtomicUsize> {
        self.lookups.clone()
    }
}

impl DocumentStore for FailingDocs {
    fn lookup(&self, path: &str) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(GemHookError::ContextRead {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "gone"),
        })
    }
}

/// Notification surface that remembers what it showed
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Settings store that keeps every saved snapshot
#[derive(Clone, Default)]
pub struct MemoryStore {
    initial: Settings,
    saved: Arc<Mutex<Vec<Settings>>>,
}

impl MemoryStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            initial,
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn saved(&self) -> Vec<Settings> {
        self.saved.lock().unwrap().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        Ok(self.saved().last().cloned().unwrap_or_else(|| self.initial.clone()))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.saved.lock().unwrap().push(settings.clone());
        Ok(())
    }
}

pub fn configured(key: &str) -> Settings {
    Settings {
        api_key: key.to_string(),
        ..Settings::default()
    }
}
