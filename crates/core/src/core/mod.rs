//! Core grammar data structures.
//!
//! This module contains the grammar store, the pair priority queue used by
//! training, and the vocabulary derived from a finished grammar.

pub mod grammar;
pub mod priority;
pub mod vocab;

pub use grammar::{is_terminal, Grammar, Pair, Rule, Symbol, NUM_TERMINALS};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use vocab::{ReverseVocabulary, Vocabulary};
