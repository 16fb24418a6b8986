//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that couples a
//! vocabulary with its reverse index and re-encodes input by greedy longest
//! match.

use bpegram_core::{Grammar, GrammarError, Result, ReverseVocabulary, Symbol, Vocabulary};
use bpegram_training::{BpeTrainer, CancellationToken, TrainingConfig, TrainingOutput};
use std::path::Path;

/// Greedily split `input` into the longest prefixes known to `reverse`.
///
/// At every position the longest candidate is tried first and shortened one
/// symbol at a time until it matches. Candidates never start longer than the
/// longest indexed expansion, since nothing longer can match.
///
/// Fails with [`GrammarError::UnmatchedSymbol`] when not even a single symbol
/// matches, which only happens with an incomplete vocabulary or input outside
/// the terminal range.
pub fn tokenize(input: &[Symbol], reverse: &ReverseVocabulary) -> Result<Vec<Symbol>> {
    let mut ids = Vec::new();
    let mut cursor = 0;

    while cursor < input.len() {
        let remaining = &input[cursor..];
        let mut len = remaining.len().min(reverse.max_len());

        let id = loop {
            if len == 0 {
                return Err(GrammarError::UnmatchedSymbol {
                    value: remaining[0],
                    position: cursor,
                });
            }
            if let Some(id) = reverse.get(&remaining[..len]) {
                break id;
            }
            len -= 1;
        };

        ids.push(id);
        cursor += len;
    }

    Ok(ids)
}

/// Main tokenizer struct.
///
/// Read-only once built; the vocabulary and reverse index come from a
/// finished grammar.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Leaf expansion of every symbol
    vocab: Vocabulary,
    /// Expansion -> symbol
    reverse: ReverseVocabulary,
}

impl Tokenizer {
    /// Build a tokenizer from a finished grammar.
    pub fn from_grammar(grammar: &Grammar) -> Result<Self> {
        Self::from_vocabulary(Vocabulary::build(grammar)?)
    }

    /// Build a tokenizer from an already derived vocabulary.
    ///
    /// Fails with [`GrammarError::GrammarAmbiguous`] when two symbols share an
    /// expansion.
    pub fn from_vocabulary(vocab: Vocabulary) -> Result<Self> {
        let reverse = ReverseVocabulary::build(&vocab)?;
        Ok(Self { vocab, reverse })
    }

    /// Train a grammar on `input` and build a tokenizer from it.
    pub fn train(
        input: &[u8],
        config: TrainingConfig,
        cancel: &CancellationToken,
    ) -> Result<(Self, TrainingOutput)> {
        let output = BpeTrainer::from_bytes(config, input)?.train(cancel)?;
        let tokenizer = Self::from_grammar(&output.grammar)?;
        Ok((tokenizer, output))
    }

    /// Load a tokenizer from a model directory.
    ///
    /// # Arguments
    /// * `path` - Directory written by [`crate::ModelSaver`]
    pub fn load(path: &Path) -> Result<Self> {
        let model = crate::io::ModelLoader::load(path)?;
        Self::from_vocabulary(model.vocab)
    }

    /// Tokenize a sequence of terminal symbols.
    pub fn tokenize(&self, input: &[Symbol]) -> Result<Vec<Symbol>> {
        tokenize(input, &self.reverse)
    }

    /// Tokenize raw bytes, each byte being its own terminal.
    pub fn tokenize_bytes(&self, input: &[u8]) -> Result<Vec<Symbol>> {
        let symbols: Vec<Symbol> = input.iter().map(|&b| Symbol::from(b)).collect();
        self.tokenize(&symbols)
    }

    /// Encode raw bytes.
    pub fn encode(&self, input: &[u8]) -> Result<Encoding> {
        let ids = self.tokenize_bytes(input)?;
        Ok(Encoding { ids })
    }

    /// Expand symbol ids back into bytes.
    pub fn decode(&self, ids: &[Symbol]) -> Result<Vec<u8>> {
        self.vocab.expand_to_bytes(ids)
    }

    /// Get the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Get the reverse vocabulary index.
    pub fn reverse_vocab(&self) -> &ReverseVocabulary {
        &self.reverse
    }

    /// Number of symbols the tokenizer can emit.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

/// Result of encoding bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Symbol ids
    pub ids: Vec<Symbol>,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
