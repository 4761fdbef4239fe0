//! Plugin settings and their persistence
//!
//! Settings are stored as TOML inside the vault at `.gemhook/settings.toml`.
//! Loading merges whatever the file contains over the defaults, so missing
//! keys (or a missing file) fall back to fixed values. The camelCase keys
//! written by earlier versions of the plugin are accepted as aliases.

use crate::core::error::{GemHookError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GEM: &str = "Project God Core ⚡ (Zeus)";
pub const DEFAULT_CONTEXT_PATH: &str = "0_DASHBOARDS/ZEUS_CONSTITUTION.md";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Environment variable that supplies a credential when none is stored.
/// It is never written back to the settings file.
pub const API_KEY_ENV: &str = "GEMHOOK_API_KEY";

const SETTINGS_DIR: &str = ".gemhook";
const SETTINGS_FILE: &str = "settings.toml";

/// User-editable plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Credential for the generative model service (may be empty)
    #[serde(alias = "apiKey")]
    pub api_key: String,

    /// Persona named in the fallback system prompt
    #[serde(alias = "defaultGem")]
    pub default_gem: String,

    /// Vault-relative path of the context document
    #[serde(alias = "defaultContextPath")]
    pub context_path: String,

    /// Boot the model client on activation
    #[serde(alias = "autoBoot", alias = "autoActivate")]
    pub auto_boot: bool,

    /// Model identifier sent with every request
    pub model: String,

    /// Abort a model call after this many seconds. `None` waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            default_gem: DEFAULT_GEM.into(),
            context_path: DEFAULT_CONTEXT_PATH.into(),
            auto_boot: true,
            model: DEFAULT_MODEL.into(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// System prompt used when no context document exists
    pub fn fallback_prompt(&self) -> String {
        format!("You are {}", self.default_gem)
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Validate settings for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".into());
        }
        if self.request_timeout_secs == Some(0) {
            return Err("request_timeout_secs must be greater than zero".into());
        }
        Ok(())
    }
}

/// Load/save capability for [`Settings`]
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// TOML-file backed settings store
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location inside a vault
    pub fn for_vault(vault_root: &Path) -> Self {
        Self::new(vault_root.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            GemHookError::Settings(format!("Invalid TOML in {}: {}", self.path.display(), e))
        })?;
        settings.validate().map_err(GemHookError::Settings)?;

        tracing::debug!(path = %self.path.display(), "settings loaded");
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(settings).map_err(|e| GemHookError::Settings(e.to_string()))?;
        fs::write(&self.path, contents)?;

        tracing::info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
