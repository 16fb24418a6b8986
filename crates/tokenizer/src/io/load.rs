//! Load functionality for trained grammars.
//!
//! Everything read from disk is validated before use: terminal rules must be
//! self-referential, nonterminals may only reference smaller ids, and the
//! stored sequence may only use symbols the grammar defines.

use super::format::{
    SectionKind, SerializedModel, FORMAT_VERSION, GRAMMAR_FILE, GRAMMAR_JSON_FILE, MAGIC,
    VOCAB_FILE,
};
use bpegram_core::{Grammar, GrammarError, Result, Rule, Symbol, Vocabulary};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Cursor over a binary artifact.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                GrammarError::Load(format!(
                    "unexpected end of data at byte {} (wanted {} more)",
                    self.pos, n
                ))
            })?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    /// Read an element count, rejecting counts the remaining bytes cannot hold.
    fn array_len(&mut self, element_size: usize) -> Result<usize> {
        let len = self.u32()? as usize;
        let remaining = self.bytes.len() - self.pos;
        if len.saturating_mul(element_size) > remaining {
            return Err(GrammarError::Load(format!(
                "array of {} elements does not fit in {} remaining bytes",
                len, remaining
            )));
        }
        Ok(len)
    }

    fn symbols(&mut self) -> Result<Vec<Symbol>> {
        let len = self.array_len(4)?;
        (0..len).map(|_| self.u32()).collect()
    }

    fn header(&mut self, expected: SectionKind) -> Result<()> {
        if self.take(4)? != MAGIC {
            return Err(GrammarError::Load("missing BPEG magic".to_string()));
        }
        let version = self.u32()?;
        if version != FORMAT_VERSION {
            return Err(GrammarError::Load(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }
        let kind = self.u8()?;
        if SectionKind::from_byte(kind) != Some(expected) {
            return Err(GrammarError::Load(format!(
                "expected {:?} section, found kind {}",
                expected, kind
            )));
        }
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(GrammarError::Load(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

/// Deserialize a grammar and its trained sequence.
pub fn decode_grammar(bytes: &[u8]) -> Result<(Grammar, Vec<Symbol>)> {
    let mut reader = ByteReader::new(bytes);
    reader.header(SectionKind::Grammar)?;

    let count = reader.array_len(8)?;
    let mut rules = Vec::with_capacity(count);
    for _ in 0..count {
        let left = reader.u32()?;
        let right = reader.u32()?;
        rules.push(Rule::new(left, right));
    }
    let sequence = reader.symbols()?;
    reader.finish()?;

    let grammar = Grammar::from_rules(rules)?;
    grammar.check_sequence(&sequence)?;
    Ok((grammar, sequence))
}

/// Deserialize a vocabulary.
pub fn decode_vocabulary(bytes: &[u8]) -> Result<Vocabulary> {
    let mut reader = ByteReader::new(bytes);
    reader.header(SectionKind::Vocabulary)?;

    let count = reader.array_len(4)?;
    let mut expansions = Vec::with_capacity(count);
    for _ in 0..count {
        expansions.push(reader.symbols()?);
    }
    reader.finish()?;

    Vocabulary::from_expansions(expansions)
}

/// Reject a stored vocabulary that does not expand the grammar it was saved with.
fn check_vocabulary(stored: &Vocabulary, derived: &Vocabulary) -> Result<()> {
    if stored.len() != derived.len() {
        return Err(GrammarError::Load(format!(
            "vocabulary has {} entries but grammar has {} rules",
            stored.len(),
            derived.len()
        )));
    }
    match stored
        .iter()
        .zip(derived.iter())
        .find(|((_, stored), (_, derived))| stored != derived)
    {
        Some(((id, _), _)) => Err(GrammarError::Load(format!(
            "stored expansion of symbol {} does not match its rule",
            id
        ))),
        None => Ok(()),
    }
}

/// A model directory read back into memory.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub grammar: Grammar,
    pub sequence: Vec<Symbol>,
    pub vocab: Vocabulary,
}

/// Tokenizer model loader - handles loading trained models.
pub struct ModelLoader;

impl ModelLoader {
    /// Load a model directory written by [`super::ModelSaver`].
    ///
    /// Binary files take precedence over `grammar.json`. When no stored
    /// vocabulary exists it is derived from the grammar.
    ///
    /// # Arguments
    /// * `path` - Directory path to load from
    pub fn load(path: &Path) -> Result<LoadedModel> {
        let binary_path = path.join(GRAMMAR_FILE);
        let (grammar, sequence) = if binary_path.exists() {
            let bytes = std::fs::read(&binary_path)
                .map_err(|e| GrammarError::io(&binary_path, e))?;
            decode_grammar(&bytes)?
        } else {
            Self::load_json(path)?
        };

        let vocab_path = path.join(VOCAB_FILE);
        let derived = Vocabulary::build(&grammar)?;
        let vocab = if vocab_path.exists() {
            let bytes = std::fs::read(&vocab_path)
                .map_err(|e| GrammarError::io(&vocab_path, e))?;
            let stored = decode_vocabulary(&bytes)?;
            check_vocabulary(&stored, &derived)?;
            stored
        } else {
            debug!("No {} in {}, deriving vocabulary", VOCAB_FILE, path.display());
            derived
        };

        Ok(LoadedModel {
            grammar,
            sequence,
            vocab,
        })
    }

    /// Load the JSON grammar artifact.
    pub fn load_json(path: &Path) -> Result<(Grammar, Vec<Symbol>)> {
        let file_path = path.join(GRAMMAR_JSON_FILE);
        let file = File::open(&file_path).map_err(|e| {
            GrammarError::Load(format!("Failed to open file {}: {}", file_path.display(), e))
        })?;

        let reader = BufReader::new(file);
        let serialized: SerializedModel = serde_json::from_reader(reader)
            .map_err(|e| GrammarError::Load(format!("Failed to deserialize grammar: {}", e)))?;

        Self::deserialize(serialized)
    }

    /// Rebuild grammar and sequence from the JSON structure.
    fn deserialize(data: SerializedModel) -> Result<(Grammar, Vec<Symbol>)> {
        if data.version != FORMAT_VERSION {
            return Err(GrammarError::Load(format!(
                "unsupported format version {} (expected {})",
                data.version, FORMAT_VERSION
            )));
        }

        let rules = data
            .rules
            .iter()
            .map(|&[left, right]| Rule::new(left, right))
            .collect();
        let grammar = Grammar::from_rules(rules)?;
        grammar.check_sequence(&data.sequence)?;

        Ok((grammar, data.sequence))
    }
}
