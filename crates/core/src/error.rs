//! Error types for the byte-pair grammar library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for grammar construction, training and tokenization.
#[derive(Error, Debug)]
pub enum GrammarError {
    /// Internal bookkeeping no longer matches the symbol sequence.
    ///
    /// Raised when a sequence holds a symbol without a rule, or when the
    /// pair frequency table is asked to decrement a pair it does not hold.
    /// Training must stop when this is returned.
    #[error("Corrupt state: {0}")]
    CorruptState(String),

    /// No vocabulary entry matches even a single input symbol.
    #[error("Unmatched symbol {value} at position {position}")]
    UnmatchedSymbol { value: u32, position: usize },

    /// Two symbols expand to the same terminal sequence.
    #[error(
        "Grammar is ambiguous: symbols {first} and {second} both expand to the same {expansion_len} terminals"
    )]
    GrammarAmbiguous {
        first: u32,
        second: u32,
        expansion_len: usize,
    },

    /// A rule would reference a symbol that is not strictly smaller than itself.
    #[error("Invalid rule for symbol {id}: ({left}, {right})")]
    InvalidRule { id: u32, left: u32, right: u32 },

    /// Symbol id outside the grammar.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(u32),

    /// Error loading a stored grammar or vocabulary
    #[error("Load error: {0}")]
    Load(String),

    /// Error saving a grammar or vocabulary
    #[error("Save error: {0}")]
    Save(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GrammarError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for grammar operations.
pub type Result<T> = std::result::Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_symbol_message() {
        let err = GrammarError::UnmatchedSymbol {
            value: 300,
            position: 7,
        };
        assert_eq!(err.to_string(), "Unmatched symbol 300 at position 7");
    }

    #[test]
    fn test_io_keeps_path() {
        let err = GrammarError::io(
            "/tmp/missing.bpeg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/missing.bpeg"));
    }
}
