//! Rendered Hyper-Command blocks
//!
//! A block tagged `gemhook` renders as a run button plus an output area.
//! Each block owns its output area. Two runs of the same block race on it
//! and whichever settles last wins.

use crate::command::executor::{HyperCommandExecutor, HyperCommandRequest, HyperCommandResult};
use std::sync::{Arc, Mutex};

/// Placeholder shown while a request is in flight
pub const EXECUTING_PLACEHOLDER: &str = "Executing ARC...";

/// Label of the run button
pub const RUN_BUTTON_LABEL: &str = "▶ Run Hyper-Command";

/// Destination for a block's visible output
pub trait OutputSink: Send + Sync {
    /// Replace whatever the sink currently shows with `text`
    fn write(&self, text: &str);
}

/// In-memory output region, cheap to clone and shared between clones
#[derive(Debug, Clone, Default)]
pub struct OutputArea {
    text: Arc<Mutex<String>>,
}

impl OutputArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl OutputSink for OutputArea {
    fn write(&self, text: &str) {
        let mut current = self
            .text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.clear();
        current.push_str(text);
    }
}

/// Write a result into a sink, replacing the placeholder
pub fn render_result(sink: &dyn OutputSink, result: &HyperCommandResult) {
    sink.write(result.text_for_display());
}

/// An interactive block: its source text and where its output goes
pub struct HyperBlock<S = OutputArea> {
    source: String,
    output: S,
}

impl HyperBlock {
    /// Render a block with a fresh in-memory output area
    pub fn render(source: impl Into<String>) -> Self {
        Self::with_sink(source, OutputArea::new())
    }
}

impl<S: OutputSink> HyperBlock<S> {
    pub fn with_sink(source: impl Into<String>, output: S) -> Self {
        Self {
            source: source.into(),
            output,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    /// Press the run button: show the placeholder, execute, show the result
    pub async fn run(
        &self,
        executor: &HyperCommandExecutor<'_>,
        credential: &str,
    ) -> HyperCommandResult {
        self.output.write(EXECUTING_PLACEHOLDER);
        let request = HyperCommandRequest::new(self.source.clone());
        let result = executor.execute(&request, credential).await;
        render_result(&self.output, &result);
        result
    }
}
