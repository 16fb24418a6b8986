//! Vocabulary derived from a finished grammar.
//!
//! [`Vocabulary`] maps every symbol to the terminals it expands to.
//! [`ReverseVocabulary`] inverts that mapping for the tokenizer and refuses
//! grammars where two symbols share an expansion.

use crate::core::grammar::{is_terminal, Grammar, Symbol, NUM_TERMINALS};
use crate::error::{GrammarError, Result};
use ahash::AHashMap;

/// Leaf expansion of every grammar symbol, indexed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    expansions: Vec<Box<[Symbol]>>,
}

impl Vocabulary {
    /// Expand every symbol of `grammar`.
    ///
    /// Children always have smaller ids than their parent, so one forward
    /// pass sees every dependency before it is needed.
    pub fn build(grammar: &Grammar) -> Result<Self> {
        let mut expansions: Vec<Box<[Symbol]>> = Vec::with_capacity(grammar.len());

        for (id, rule) in grammar.rules().iter().enumerate() {
            let id = id as Symbol;
            if is_terminal(id) {
                expansions.push(Box::new([id]));
                continue;
            }

            let (left, right) = match (
                expansions.get(rule.left as usize),
                expansions.get(rule.right as usize),
            ) {
                (Some(left), Some(right)) if rule.left < id && rule.right < id => (left, right),
                _ => {
                    return Err(GrammarError::InvalidRule {
                        id,
                        left: rule.left,
                        right: rule.right,
                    })
                }
            };

            let mut expansion = Vec::with_capacity(left.len() + right.len());
            expansion.extend_from_slice(left);
            expansion.extend_from_slice(right);
            expansions.push(expansion.into_boxed_slice());
        }

        Ok(Self { expansions })
    }

    /// Rebuild a vocabulary from stored expansions.
    ///
    /// Terminals must expand to themselves and every other entry must be a
    /// non-empty run of terminals.
    pub fn from_expansions(expansions: Vec<Vec<Symbol>>) -> Result<Self> {
        if expansions.len() < NUM_TERMINALS {
            return Err(GrammarError::Load(format!(
                "vocabulary has {} entries, expected at least {}",
                expansions.len(),
                NUM_TERMINALS
            )));
        }

        for (id, expansion) in expansions.iter().enumerate() {
            let valid = if id < NUM_TERMINALS {
                expansion.as_slice() == [id as Symbol]
            } else {
                expansion.len() >= 2 && expansion.iter().all(|&s| is_terminal(s))
            };
            if !valid {
                return Err(GrammarError::Load(format!(
                    "malformed expansion for symbol {}",
                    id
                )));
            }
        }

        Ok(Self {
            expansions: expansions.into_iter().map(Vec::into_boxed_slice).collect(),
        })
    }

    /// Get the expansion of a symbol.
    #[inline]
    pub fn get(&self, symbol: Symbol) -> Option<&[Symbol]> {
        self.expansions.get(symbol as usize).map(|e| &**e)
    }

    /// Number of symbols in the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.expansions.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Iterate symbols together with their expansions.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &[Symbol])> + '_ {
        self.expansions
            .iter()
            .enumerate()
            .map(|(id, e)| (id as Symbol, &**e))
    }

    /// Concatenate the expansions of every symbol in `sequence`.
    pub fn expand_sequence(&self, sequence: &[Symbol]) -> Result<Vec<Symbol>> {
        let mut out = Vec::with_capacity(sequence.len());
        for &symbol in sequence {
            let expansion = self
                .get(symbol)
                .ok_or(GrammarError::UnknownSymbol(symbol))?;
            out.extend_from_slice(expansion);
        }
        Ok(out)
    }

    /// Expand `sequence` all the way down to bytes.
    pub fn expand_to_bytes(&self, sequence: &[Symbol]) -> Result<Vec<u8>> {
        let terminals = self.expand_sequence(sequence)?;
        // Every expansion holds terminals only, all of which fit in a byte.
        Ok(terminals.into_iter().map(|s| s as u8).collect())
    }
}

/// Inverse lookup from a terminal expansion to the symbol producing it.
#[derive(Debug, Clone)]
pub struct ReverseVocabulary {
    index: AHashMap<Box<[Symbol]>, Symbol>,
    max_len: usize,
}

impl ReverseVocabulary {
    /// Invert `vocab`, rejecting any expansion claimed by two symbols.
    pub fn build(vocab: &Vocabulary) -> Result<Self> {
        let mut index: AHashMap<Box<[Symbol]>, Symbol> = AHashMap::with_capacity(vocab.len());
        let mut max_len = 0;

        for (id, expansion) in vocab.iter() {
            if let Some(&first) = index.get(expansion) {
                return Err(GrammarError::GrammarAmbiguous {
                    first,
                    second: id,
                    expansion_len: expansion.len(),
                });
            }
            max_len = max_len.max(expansion.len());
            index.insert(expansion.into(), id);
        }

        Ok(Self { index, max_len })
    }

    /// Look up the symbol whose expansion is exactly `expansion`.
    #[inline]
    pub fn get(&self, expansion: &[Symbol]) -> Option<Symbol> {
        self.index.get(expansion).copied()
    }

    /// Length of the longest expansion in the index.
    #[inline]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of indexed expansions.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar_with(pairs: &[(Symbol, Symbol)]) -> Grammar {
        let mut grammar = Grammar::new();
        for &pair in pairs {
            grammar.append(pair).unwrap();
        }
        grammar
    }

    #[test]
    fn test_terminals_expand_to_themselves() {
        let vocab = Vocabulary::build(&Grammar::new()).unwrap();
        assert_eq!(vocab.len(), NUM_TERMINALS);
        assert_eq!(vocab.get(0), Some(&[0][..]));
        assert_eq!(vocab.get(255), Some(&[255][..]));
    }

    #[test]
    fn test_nested_expansion() {
        // 256 = "ab", 257 = "abc", 258 = "abcab"
        let grammar = grammar_with(&[(97, 98), (256, 99), (257, 256)]);
        let vocab = Vocabulary::build(&grammar).unwrap();

        assert_eq!(vocab.get(256), Some(&[97, 98][..]));
        assert_eq!(vocab.get(257), Some(&[97, 98, 99][..]));
        assert_eq!(vocab.get(258), Some(&[97, 98, 99, 97, 98][..]));
    }

    #[test]
    fn test_expand_sequence() {
        let grammar = grammar_with(&[(104, 105)]);
        let vocab = Vocabulary::build(&grammar).unwrap();

        assert_eq!(vocab.expand_sequence(&[256, 33]).unwrap(), vec![104, 105, 33]);
        assert_eq!(vocab.expand_to_bytes(&[256, 33]).unwrap(), b"hi!".to_vec());
        assert!(matches!(
            vocab.expand_sequence(&[999]),
            Err(GrammarError::UnknownSymbol(999))
        ));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let mut grammar = Grammar::new();
        let mut last = 97;
        for _ in 0..2_000 {
            last = grammar.append((last, 97)).unwrap();
        }

        let vocab = Vocabulary::build(&grammar).unwrap();
        assert_eq!(vocab.get(last).unwrap().len(), 2_001);
    }

    #[test]
    fn test_from_expansions_rejects_bad_terminal() {
        let mut expansions: Vec<Vec<Symbol>> =
            (0..NUM_TERMINALS as Symbol).map(|s| vec![s]).collect();
        expansions[3] = vec![4];
        assert!(matches!(
            Vocabulary::from_expansions(expansions),
            Err(GrammarError::Load(_))
        ));
    }

    #[test]
    fn test_from_expansions_matches_build() {
        let grammar = grammar_with(&[(120, 121), (256, 256)]);
        let vocab = Vocabulary::build(&grammar).unwrap();
        let stored: Vec<Vec<Symbol>> = vocab.iter().map(|(_, e)| e.to_vec()).collect();

        assert_eq!(Vocabulary::from_expansions(stored).unwrap(), vocab);
    }

    #[test]
    fn test_reverse_lookup() {
        let grammar = grammar_with(&[(97, 98), (256, 256)]);
        let vocab = Vocabulary::build(&grammar).unwrap();
        let reverse = ReverseVocabulary::build(&vocab).unwrap();

        assert_eq!(reverse.len(), 258);
        assert_eq!(reverse.get(&[97]), Some(97));
        assert_eq!(reverse.get(&[97, 98]), Some(256));
        assert_eq!(reverse.get(&[97, 98, 97, 98]), Some(257));
        assert_eq!(reverse.get(&[98, 97]), None);
        assert_eq!(reverse.max_len(), 4);
    }

    #[test]
    fn test_reverse_rejects_collision() {
        // 257 = (ab)c and 259 = a(bc) both expand to "abc"
        let grammar = grammar_with(&[(97, 98), (256, 99), (98, 99), (97, 258)]);
        let vocab = Vocabulary::build(&grammar).unwrap();

        match ReverseVocabulary::build(&vocab) {
            Err(GrammarError::GrammarAmbiguous {
                first,
                second,
                expansion_len,
            }) => {
                assert_eq!(first, 257);
                assert_eq!(second, 259);
                assert_eq!(expansion_len, 3);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }
}
