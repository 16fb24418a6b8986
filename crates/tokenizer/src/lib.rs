//! Bpegram-tokenizer - Tokenizer API for byte-pair grammars
//!
//! This crate turns a trained grammar into a tokenizer, re-encodes input by
//! greedy longest match, and stores grammars and vocabularies on disk.
//!
//! # Features
//!
//! - Greedy longest-prefix tokenization over the reverse vocabulary
//! - Decoding of symbol ids back to bytes
//! - Versioned binary model files plus a JSON grammar form
//! - Diagnostic rendering of compressed sequences
//!
//! # Example
//!
//! ```rust
//! use bpegram_tokenizer::{CancellationToken, Tokenizer, TrainingConfig};
//!
//! let (tokenizer, _output) = Tokenizer::train(
//!     b"hello hello hello",
//!     TrainingConfig::default(),
//!     &CancellationToken::new(),
//! )?;
//!
//! let encoding = tokenizer.encode(b"hello")?;
//! assert_eq!(tokenizer.decode(&encoding.ids)?, b"hello");
//! # Ok::<(), bpegram_tokenizer::GrammarError>(())
//! ```

// Re-export core and training types
pub use bpegram_core::{
    Grammar, GrammarError, Result, ReverseVocabulary, Rule, Symbol, Vocabulary,
};
pub use bpegram_training::{
    BpeTrainer, CancellationToken, StopReason, TrainingConfig, TrainingOutput,
};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{tokenize, Encoding, Tokenizer};

// IO/Serialization
pub mod io;
pub use io::{LoadedModel, ModelFormat, ModelLoader, ModelSaver};

// Utilities
pub mod utils;
pub use utils::render;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
