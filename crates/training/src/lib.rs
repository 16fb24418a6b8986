//! Bpegram-training - Incremental BPE grammar training
//!
//! This crate grows a byte-pair grammar from a byte stream by merging the most
//! frequent adjacent pair until no pair repeats.
//!
//! # Features
//!
//! - Pair counts patched per substitution instead of recounted per merge
//! - Deterministic tie-breaking (earliest-seen pair wins)
//! - Cooperative cancellation that always leaves a valid grammar
//! - Resuming training on top of an existing grammar
//!
//! # Example
//!
//! ```rust
//! use bpegram_training::{BpeTrainer, CancellationToken, TrainingConfig};
//!
//! let config = TrainingConfig::builder().max_merges(100).build()?;
//! let trainer = BpeTrainer::from_bytes(config, b"abababab")?;
//! let output = trainer.train(&CancellationToken::new())?;
//!
//! assert_eq!(output.grammar.len(), 258);
//! # Ok::<(), bpegram_training::GrammarError>(())
//! ```

pub use bpegram_core::{GrammarError, Result};

// Training infrastructure
pub mod training;
pub use training::{
    BpeTrainer, CancellationToken, MergeRecord, PairFrequencyTable, StopReason, TrainingConfig,
    TrainingConfigBuilder, TrainingOutput,
};
