//! Hyper-Command pipeline
//!
//! note text -> scanner -> HyperBlock -> HyperCommandExecutor -> OutputSink

pub mod block;
pub mod executor;
pub mod scanner;

pub use block::{HyperBlock, OutputArea, OutputSink};
pub use executor::{
    HyperCommandExecutor, HyperCommandRequest, HyperCommandResult, Notifier,
};
pub use scanner::{find_blocks, last_block, run_last_block, HYPER_BLOCK_TAG};
