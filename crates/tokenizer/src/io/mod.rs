//! Serialization and deserialization for trained grammars.
//!
//! This module provides a versioned binary layout for the grammar, its
//! trained sequence and the derived vocabulary, plus a JSON form of the
//! grammar for inspection. None of it is used by training itself.

pub mod format;
pub mod load;
pub mod save;

pub use format::{ModelFormat, SerializedModel};
pub use load::{decode_grammar, decode_vocabulary, LoadedModel, ModelLoader};
pub use save::{encode_grammar, encode_vocabulary, ModelSaver};
