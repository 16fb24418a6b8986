//! Save functionality for trained grammars.
//!
//! The `encode_*` functions produce the binary artifacts in memory;
//! [`ModelSaver`] writes them (or the JSON form) into a model directory.

use super::format::{
    ModelFormat, SectionKind, SerializedModel, FORMAT_VERSION, GRAMMAR_FILE, GRAMMAR_JSON_FILE,
    MAGIC, VOCAB_FILE,
};
use bpegram_core::{Grammar, GrammarError, Result, Symbol, Vocabulary};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn header(kind: SectionKind, capacity: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(9 + capacity);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(kind as u8);
    out
}

fn put_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| GrammarError::Save(format!("array of {} elements is too long", len)))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn put_symbols(out: &mut Vec<u8>, symbols: &[Symbol]) -> Result<()> {
    put_len(out, symbols.len())?;
    for symbol in symbols {
        out.extend_from_slice(&symbol.to_le_bytes());
    }
    Ok(())
}

/// Serialize a grammar and its trained sequence.
pub fn encode_grammar(grammar: &Grammar, sequence: &[Symbol]) -> Result<Vec<u8>> {
    let mut out = header(
        SectionKind::Grammar,
        8 * grammar.len() + 4 * sequence.len() + 8,
    );

    put_len(&mut out, grammar.len())?;
    for rule in grammar.rules() {
        out.extend_from_slice(&rule.left.to_le_bytes());
        out.extend_from_slice(&rule.right.to_le_bytes());
    }
    put_symbols(&mut out, sequence)?;

    Ok(out)
}

/// Serialize a vocabulary.
pub fn encode_vocabulary(vocab: &Vocabulary) -> Result<Vec<u8>> {
    let mut out = header(SectionKind::Vocabulary, 8 * vocab.len() + 4);

    put_len(&mut out, vocab.len())?;
    for (_, expansion) in vocab.iter() {
        put_symbols(&mut out, expansion)?;
    }

    Ok(out)
}

/// Tokenizer model saver - writes a grammar, its sequence and vocabulary.
pub struct ModelSaver<'a> {
    /// Grammar reference
    grammar: &'a Grammar,
    /// Trained sequence
    sequence: &'a [Symbol],
    /// Vocabulary, derived on save when not supplied
    vocab: Option<&'a Vocabulary>,
}

impl<'a> ModelSaver<'a> {
    /// Create a new saver.
    pub fn new(grammar: &'a Grammar, sequence: &'a [Symbol]) -> Self {
        Self {
            grammar,
            sequence,
            vocab: None,
        }
    }

    /// Reuse an already built vocabulary instead of deriving it again.
    pub fn with_vocabulary(mut self, vocab: &'a Vocabulary) -> Self {
        self.vocab = Some(vocab);
        self
    }

    /// Save into the directory `path`, creating it if needed.
    ///
    /// # Arguments
    /// * `path` - Directory path to save to
    /// * `format` - Binary writes grammar and vocabulary files, JSON writes
    ///   only the grammar (the vocabulary is derived again on load)
    pub fn save(&self, path: &Path, format: ModelFormat) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| GrammarError::io(path, e))?;

        match format {
            ModelFormat::Binary => {
                let grammar_bytes = encode_grammar(self.grammar, self.sequence)?;
                write_file(&path.join(GRAMMAR_FILE), &grammar_bytes)?;

                let built;
                let vocab = match self.vocab {
                    Some(vocab) => vocab,
                    None => {
                        built = Vocabulary::build(self.grammar)?;
                        &built
                    }
                };
                write_file(&path.join(VOCAB_FILE), &encode_vocabulary(vocab)?)?;
            }
            ModelFormat::Json => {
                let file_path = path.join(GRAMMAR_JSON_FILE);
                let file =
                    File::create(&file_path).map_err(|e| GrammarError::io(&file_path, e))?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, &self.serialize()).map_err(|e| {
                    GrammarError::Save(format!("Failed to serialize grammar: {}", e))
                })?;
                writer.flush().map_err(|e| GrammarError::io(&file_path, e))?;
            }
        }

        info!(
            "Saved {} rules and {} symbols to {} ({:?})",
            self.grammar.len(),
            self.sequence.len(),
            path.display(),
            format
        );
        Ok(())
    }

    /// Serialize to the JSON structure.
    fn serialize(&self) -> SerializedModel {
        SerializedModel {
            version: FORMAT_VERSION,
            rules: self
                .grammar
                .rules()
                .iter()
                .map(|rule| [rule.left, rule.right])
                .collect(),
            sequence: self.sequence.to_vec(),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| GrammarError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| GrammarError::io(path, e))
}
