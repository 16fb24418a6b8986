//! Human-readable rendering of symbol sequences.
//!
//! Purely diagnostic: terminals print as their character and nonterminals as
//! a bracketed id, so the shape of a compressed sequence can be eyeballed.

use bpegram_core::{is_terminal, Grammar, GrammarError, Result, Symbol};
use std::fmt::Write;

/// Render `sequence`, checking every symbol against `grammar`.
///
/// Printable ASCII, space, tab and newline print as themselves; other bytes
/// print as `\xNN`. Nonterminals print as `[id]`.
pub fn render(sequence: &[Symbol], grammar: &Grammar) -> Result<String> {
    let mut out = String::with_capacity(sequence.len());

    for &symbol in sequence {
        if !grammar.contains(symbol) {
            return Err(GrammarError::UnknownSymbol(symbol));
        }
        if is_terminal(symbol) {
            push_byte(&mut out, symbol as u8);
        } else {
            // Writing into a String cannot fail.
            let _ = write!(out, "[{}]", symbol);
        }
    }

    Ok(out)
}

fn push_byte(out: &mut String, byte: u8) {
    match byte {
        b' ' | b'\t' | b'\n' => out.push(byte as char),
        _ if byte.is_ascii_graphic() => out.push(byte as char),
        _ => {
            let _ = write!(out, "\\x{:02x}", byte);
        }
    }
}
