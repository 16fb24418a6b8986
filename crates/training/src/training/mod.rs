//! Training infrastructure for byte-pair grammars.
//!
//! This module provides the pair frequency table, the merge loop that grows
//! the grammar, and the cancellation token used to stop it early.

pub mod cancel;
pub mod counter;
pub mod trainer;

pub use cancel::CancellationToken;
pub use counter::PairFrequencyTable;
pub use trainer::{
    BpeTrainer, MergeRecord, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingOutput,
};
