//! Format definitions for grammar and vocabulary serialization.
//!
//! # Binary layout
//!
//! Every binary artifact starts with a header:
//!
//! | bytes | content |
//! |---|---|
//! | 4 | magic `BPEG` |
//! | 4 | format version, little-endian `u32` |
//! | 1 | section kind ([`SectionKind`]) |
//!
//! All integers that follow are little-endian `u32`. Arrays are written as
//! their element count followed by the elements.
//!
//! - Grammar: rule count, then `left right` per rule; sequence length, then
//!   the sequence.
//! - Vocabulary: entry count, then per entry its length and its terminals.

use serde::{Deserialize, Serialize};

/// Leading bytes of every binary artifact.
pub const MAGIC: [u8; 4] = *b"BPEG";

/// Current binary and JSON format version.
pub const FORMAT_VERSION: u32 = 1;

/// File holding the grammar and the trained sequence (binary).
pub const GRAMMAR_FILE: &str = "grammar.bpeg";

/// File holding the derived vocabulary (binary).
pub const VOCAB_FILE: &str = "vocab.bpeg";

/// File holding the grammar and the trained sequence (JSON).
pub const GRAMMAR_JSON_FILE: &str = "grammar.json";

/// Kind of payload following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SectionKind {
    Grammar = 1,
    Vocabulary = 2,
}

impl SectionKind {
    /// Parse the kind byte of a header.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Grammar),
            2 => Some(Self::Vocabulary),
            _ => None,
        }
    }
}

/// Model format types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelFormat {
    /// Versioned binary files (grammar.bpeg + vocab.bpeg)
    #[default]
    Binary,
    /// Human-readable grammar.json
    Json,
}

impl std::str::FromStr for ModelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "invalid model format: {s:?} (expected \"binary\" or \"json\")"
            )),
        }
    }
}

/// JSON form of the grammar artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Format version
    pub version: u32,
    /// Rules in id order, terminals included
    pub rules: Vec<[u32; 2]>,
    /// Trained sequence
    pub sequence: Vec<u32>,
}
