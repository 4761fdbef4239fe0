pub mod config;
pub mod error;

pub use config::{FileSettingsStore, Settings, SettingsStore};
pub use error::{GemHookError, ModelError, Result};
