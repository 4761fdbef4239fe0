//! GemHook - run Hyper-Command blocks from Markdown notes against Gemini

pub mod app;
pub mod command;
pub mod core;
pub mod llm;
pub mod vault;

pub use app::GemHook;
