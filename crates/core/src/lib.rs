//! Bpegram-core - Byte-pair grammar data structures
//!
//! This crate provides the grammar store, vocabulary derivation and reverse
//! vocabulary index shared by training and tokenization.
//!
//! # Features
//!
//! - Append-only grammar whose rules only reference smaller ids
//! - Recursion-free leaf expansion of every symbol
//! - Reverse index that rejects ambiguous grammars
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use bpegram_core::{Grammar, ReverseVocabulary, Vocabulary};
//!
//! let mut grammar = Grammar::new();
//! let ab = grammar.append((b'a' as u32, b'b' as u32))?;
//!
//! let vocab = Vocabulary::build(&grammar)?;
//! let reverse = ReverseVocabulary::build(&vocab)?;
//! assert_eq!(reverse.get(&[97, 98]), Some(ab));
//! # Ok::<(), bpegram_core::GrammarError>(())
//! ```

pub mod error;
pub use error::{GrammarError, Result};

pub mod core;
pub use self::core::{
    is_terminal, Grammar, MergeCandidate, Pair, PairPriorityQueue, ReverseVocabulary, Rule,
    Symbol, Vocabulary, NUM_TERMINALS,
};
