//! Locate Hyper-Command blocks in raw note text

use crate::command::executor::Notifier;
use regex::Regex;
use std::sync::OnceLock;

/// Fence language that marks a Hyper-Command block
pub const HYPER_BLOCK_TAG: &str = "gemhook";

/// Notification raised when the last block has been located
pub const RUN_LAST_NOTICE: &str = "Running last Hyper-Command...";

fn block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(r"```{}\n([\s\S]*?)\n```", regex::escape(HYPER_BLOCK_TAG));
        Regex::new(&pattern).expect("hyper block pattern is a valid regex")
    })
}

/// Bodies of every Hyper-Command block, in document order
///
/// Fences must use `\n` line endings. A body ends at the first line that
/// starts with three backticks.
pub fn find_blocks(content: &str) -> Vec<String> {
    block_pattern()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

pub fn last_block(content: &str) -> Option<String> {
    find_blocks(content).pop()
}

/// Locate the last block of a note and announce it
///
/// The located text is returned but not executed.
pub fn run_last_block(content: &str, notifier: &dyn Notifier) -> Option<String> {
    let last = last_block(content)?;
    // TODO: hand `last` to the executor once the command is meant to run it
    notifier.notify(RUN_LAST_NOTICE);
    tracing::debug!(block_len = last.len(), "located last hyper-command block");
    Some(last)
}
