//! Utility modules for the tokenizer.

pub mod render;

pub use render::render;
