//! Grammar store for byte-pair grammars.
//!
//! Every symbol id owns exactly one rule, stored at the index equal to the id.
//! Ids below [`NUM_TERMINALS`] are terminals whose rule points at themselves;
//! every later id is a nonterminal built from two strictly smaller ids, so the
//! rules always form a DAG.

use crate::error::{GrammarError, Result};

/// Identifier of a terminal (byte) or nonterminal (merged pair).
pub type Symbol = u32;

/// An ordered pair of adjacent symbols.
pub type Pair = (Symbol, Symbol);

/// Number of terminal symbols, one per byte value.
pub const NUM_TERMINALS: usize = 256;

/// Production rule of a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub left: Symbol,
    pub right: Symbol,
}

impl Rule {
    /// Create a rule from its two children.
    pub fn new(left: Symbol, right: Symbol) -> Self {
        Self { left, right }
    }

    /// The self-referential rule of a terminal.
    pub fn terminal(symbol: Symbol) -> Self {
        Self {
            left: symbol,
            right: symbol,
        }
    }

    /// The pair this rule rewrites.
    #[inline]
    pub fn pair(&self) -> Pair {
        (self.left, self.right)
    }
}

/// Returns true for symbol ids that stand for a single byte.
#[inline]
pub fn is_terminal(symbol: Symbol) -> bool {
    (symbol as usize) < NUM_TERMINALS
}

/// Append-only table of rules indexed by symbol id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Create a grammar holding only the 256 terminal rules.
    pub fn new() -> Self {
        let rules = (0..NUM_TERMINALS as Symbol).map(Rule::terminal).collect();
        Self { rules }
    }

    /// Rebuild a grammar from stored rules, checking every invariant.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        if rules.len() < NUM_TERMINALS {
            return Err(GrammarError::Load(format!(
                "grammar has {} rules, expected at least {}",
                rules.len(),
                NUM_TERMINALS
            )));
        }

        let mut grammar = Self::new();
        for (id, rule) in rules.iter().enumerate().take(NUM_TERMINALS) {
            if *rule != Rule::terminal(id as Symbol) {
                return Err(GrammarError::InvalidRule {
                    id: id as Symbol,
                    left: rule.left,
                    right: rule.right,
                });
            }
        }
        for rule in &rules[NUM_TERMINALS..] {
            grammar.append(rule.pair())?;
        }

        Ok(grammar)
    }

    /// Append a nonterminal for `pair` and return its new id.
    ///
    /// Both children must already exist, which keeps the rule graph acyclic.
    pub fn append(&mut self, pair: Pair) -> Result<Symbol> {
        let id = Symbol::try_from(self.rules.len()).map_err(|_| {
            GrammarError::CorruptState(format!("symbol space exhausted at {}", self.rules.len()))
        })?;

        if pair.0 >= id || pair.1 >= id {
            return Err(GrammarError::InvalidRule {
                id,
                left: pair.0,
                right: pair.1,
            });
        }

        self.rules.push(Rule::new(pair.0, pair.1));
        Ok(id)
    }

    /// Get the rule of a symbol.
    #[inline]
    pub fn get(&self, symbol: Symbol) -> Option<Rule> {
        self.rules.get(symbol as usize).copied()
    }

    /// Get the rule of a symbol, failing for ids outside the grammar.
    pub fn rule(&self, symbol: Symbol) -> Result<Rule> {
        self.get(symbol).ok_or(GrammarError::UnknownSymbol(symbol))
    }

    /// Check whether a symbol has a rule.
    #[inline]
    pub fn contains(&self, symbol: Symbol) -> bool {
        (symbol as usize) < self.rules.len()
    }

    /// Number of rules, terminals included.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// A grammar always carries its terminals, so this is only true for
    /// grammars that were never initialized.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of merged symbols.
    #[inline]
    pub fn num_nonterminals(&self) -> usize {
        self.rules.len().saturating_sub(NUM_TERMINALS)
    }

    /// All rules in id order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterate nonterminal ids together with their rules.
    pub fn nonterminals(&self) -> impl Iterator<Item = (Symbol, Rule)> + '_ {
        self.rules
            .iter()
            .enumerate()
            .skip(NUM_TERMINALS)
            .map(|(id, rule)| (id as Symbol, *rule))
    }

    /// Check that every symbol of `sequence` has a rule.
    pub fn check_sequence(&self, sequence: &[Symbol]) -> Result<()> {
        match sequence.iter().position(|&s| !self.contains(s)) {
            Some(position) => Err(GrammarError::CorruptState(format!(
                "symbol {} at position {} has no rule (grammar holds {})",
                sequence[position],
                position,
                self.len()
            ))),
            None => Ok(()),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_terminals() {
        let grammar = Grammar::new();
        assert_eq!(grammar.len(), NUM_TERMINALS);
        assert_eq!(grammar.num_nonterminals(), 0);
        assert_eq!(grammar.get(97), Some(Rule::terminal(97)));
        assert_eq!(grammar.get(256), None);
    }

    #[test]
    fn test_append_assigns_next_id() {
        let mut grammar = Grammar::new();
        assert_eq!(grammar.append((97, 98)).unwrap(), 256);
        assert_eq!(grammar.append((256, 99)).unwrap(), 257);
        assert_eq!(grammar.get(257), Some(Rule::new(256, 99)));
        assert_eq!(grammar.num_nonterminals(), 2);
    }

    #[test]
    fn test_append_rejects_forward_reference() {
        let mut grammar = Grammar::new();
        let err = grammar.append((97, 256)).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::InvalidRule {
                id: 256,
                left: 97,
                right: 256
            }
        ));
        assert_eq!(grammar.len(), NUM_TERMINALS);
    }

    #[test]
    fn test_from_rules_validates_terminals() {
        let mut rules = Grammar::new().rules().to_vec();
        rules[10] = Rule::new(10, 0);
        assert!(matches!(
            Grammar::from_rules(rules),
            Err(GrammarError::InvalidRule { id: 10, .. })
        ));
    }

    #[test]
    fn test_from_rules_roundtrip() {
        let mut grammar = Grammar::new();
        grammar.append((1, 2)).unwrap();
        grammar.append((256, 256)).unwrap();

        let rebuilt = Grammar::from_rules(grammar.rules().to_vec()).unwrap();
        assert_eq!(rebuilt, grammar);
    }

    #[test]
    fn test_check_sequence() {
        let mut grammar = Grammar::new();
        grammar.append((1, 2)).unwrap();

        assert!(grammar.check_sequence(&[0, 255, 256]).is_ok());
        assert!(matches!(
            grammar.check_sequence(&[0, 257]),
            Err(GrammarError::CorruptState(_))
        ));
    }

    #[test]
    fn test_nonterminals_iter() {
        let mut grammar = Grammar::new();
        grammar.append((104, 105)).unwrap();
        let collected: Vec<_> = grammar.nonterminals().collect();
        assert_eq!(collected, vec![(256, Rule::new(104, 105))]);
    }
}
