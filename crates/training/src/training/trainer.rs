//! BPE trainer implementation.
//!
//! Repeatedly merges the most frequent adjacent pair of the symbol sequence
//! into a new grammar symbol until no pair occurs often enough. Each merge
//! rewrites the sequence in one left-to-right pass into a second buffer and
//! patches the pair frequency table for exactly the pairs it touches.

use super::cancel::CancellationToken;
use super::counter::PairFrequencyTable;
use bpegram_core::{Grammar, GrammarError, Pair, Result, Symbol};
use log::{debug, info, warn};

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Stop after this many merges (`None` runs to the fixed point)
    pub max_merges: Option<usize>,
    /// Minimum frequency for a pair to be merged
    pub min_frequency: u64,
    /// Iterations between progress logs (0 disables them)
    pub log_interval: usize,
    /// Recount every pair after each merge and fail on any mismatch
    pub verify_invariants: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_merges: None,
            min_frequency: 2,
            log_interval: 1000,
            verify_invariants: false,
        }
    }
}

impl TrainingConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the configuration for values training cannot honour.
    pub fn validate(&self) -> Result<()> {
        // A pair seen once cannot shorten the sequence.
        if self.min_frequency < 2 {
            return Err(GrammarError::InvalidConfig(format!(
                "min_frequency must be at least 2, got {}",
                self.min_frequency
            )));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Cap the number of merges.
    pub fn max_merges(mut self, merges: usize) -> Self {
        self.config.max_merges = Some(merges);
        self
    }

    /// Set the minimum pair frequency.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set the number of iterations between progress logs.
    pub fn log_interval(mut self, interval: usize) -> Self {
        self.config.log_interval = interval;
        self
    }

    /// Enable or disable the per-merge consistency check.
    pub fn verify_invariants(mut self, verify: bool) -> Self {
        self.config.verify_invariants = verify;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// One performed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRecord {
    /// The pair that was replaced
    pub pair: Pair,
    /// Its frequency just before the merge
    pub frequency: u64,
    /// The symbol that replaced it
    pub symbol: Symbol,
}

/// Why a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No pair occurs often enough to merge.
    Exhausted,
    /// The configured merge cap was reached.
    MaxMerges,
    /// A stop was requested through the cancellation token.
    Cancelled,
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// The compressed sequence
    pub sequence: Vec<Symbol>,
    /// The grammar that expands it back
    pub grammar: Grammar,
    /// Merges performed by this trainer
    pub merges: usize,
    /// Why training stopped
    pub stop_reason: StopReason,
}

/// BPE trainer.
///
/// Owns the grammar, the current symbol sequence and its pair frequency
/// table, and keeps the three consistent across merges.
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Grammar being grown
    grammar: Grammar,
    /// Current sequence (source buffer)
    sequence: Vec<Symbol>,
    /// Destination buffer reused by every rewrite
    scratch: Vec<Symbol>,
    /// Pair counts of `sequence`
    table: PairFrequencyTable,
    /// Merges performed so far
    merges: usize,
}

impl BpeTrainer {
    /// Start training on raw bytes with a terminals-only grammar.
    ///
    /// Every input byte, the last one included, becomes a terminal symbol.
    pub fn from_bytes(config: TrainingConfig, input: &[u8]) -> Result<Self> {
        let sequence = input.iter().map(|&b| Symbol::from(b)).collect();
        Self::resume(config, Grammar::new(), sequence)
    }

    /// Continue training an existing grammar on an already-encoded sequence.
    pub fn resume(config: TrainingConfig, grammar: Grammar, sequence: Vec<Symbol>) -> Result<Self> {
        config.validate()?;
        grammar.check_sequence(&sequence)?;

        let table = PairFrequencyTable::from_sequence(&sequence);
        let scratch = Vec::with_capacity(sequence.len());

        Ok(Self {
            config,
            grammar,
            sequence,
            scratch,
            table,
            merges: 0,
        })
    }

    /// Perform one merge.
    ///
    /// Returns `None` without touching any state when no pair reaches the
    /// minimum frequency.
    pub fn merge_step(&mut self) -> Result<Option<MergeRecord>> {
        let (pair, frequency) = match self.table.most_frequent(self.config.min_frequency) {
            Some(best) => best,
            None => return Ok(None),
        };

        let symbol = self.grammar.append(pair)?;
        self.substitute(pair, symbol)?;
        self.merges += 1;

        if self.config.verify_invariants {
            self.table.verify(&self.sequence)?;
        }
        self.table.compact();

        Ok(Some(MergeRecord {
            pair,
            frequency,
            symbol,
        }))
    }

    /// Rewrite the sequence, replacing every non-overlapping occurrence of
    /// `pair` (scanning left to right) with `symbol`.
    ///
    /// For `a [L R] d -> a Z d` the pairs `(a, L)`, `(R, d)` and `(L, R)` lose
    /// one occurrence and `(a, Z)`, `(Z, d)` gain one, where `a` is the last
    /// symbol already written and `d` the symbol after the match.
    fn substitute(&mut self, pair: Pair, symbol: Symbol) -> Result<()> {
        let source = &self.sequence;
        let dest = &mut self.scratch;
        let table = &mut self.table;
        let known = self.grammar.len();

        dest.clear();
        let mut idx = 0;
        while idx < source.len() {
            let current = source[idx];
            if current as usize >= known {
                return Err(GrammarError::CorruptState(format!(
                    "symbol {} at position {} has no rule (grammar holds {})",
                    current, idx, known
                )));
            }

            let next = match source.get(idx + 1) {
                Some(&next) if (current, next) == pair => next,
                _ => {
                    dest.push(current);
                    idx += 1;
                    continue;
                }
            };

            let before = dest.last().copied();
            let after = source.get(idx + 2).copied();

            if let Some(a) = before {
                table.decrement((a, current))?;
            }
            if let Some(d) = after {
                table.decrement((next, d))?;
            }
            if let Some(a) = before {
                table.increment((a, symbol));
            }
            if let Some(d) = after {
                table.increment((symbol, d));
            }
            table.decrement(pair)?;

            dest.push(symbol);
            idx += 2;
        }

        std::mem::swap(&mut self.sequence, &mut self.scratch);
        Ok(())
    }

    /// Merge until the fixed point, the merge cap, or cancellation.
    ///
    /// `cancel` is polled once before every merge; a merge in progress is
    /// always finished, so the output is a valid if incomplete grammar.
    pub fn train(mut self, cancel: &CancellationToken) -> Result<TrainingOutput> {
        info!(
            "Training on {} symbols ({} rules, {} distinct pairs)",
            self.sequence.len(),
            self.grammar.len(),
            self.table.len()
        );

        let stop_reason = loop {
            if cancel.is_cancelled() {
                warn!("Training cancelled after {} merges", self.merges);
                break StopReason::Cancelled;
            }
            if self.config.max_merges.is_some_and(|max| self.merges >= max) {
                break StopReason::MaxMerges;
            }

            let record = match self.merge_step()? {
                Some(record) => record,
                None => break StopReason::Exhausted,
            };

            let interval = self.config.log_interval;
            if interval > 0 && self.merges % interval == 0 {
                debug!(
                    "merge {}: ({}, {}) x{} -> {}; sequence {}, grammar {}, pairs {}",
                    self.merges,
                    record.pair.0,
                    record.pair.1,
                    record.frequency,
                    record.symbol,
                    self.sequence.len(),
                    self.grammar.len(),
                    self.table.len()
                );
            }
        };

        info!(
            "Training stopped ({:?}) after {} merges: {} symbols, {} rules",
            stop_reason,
            self.merges,
            self.sequence.len(),
            self.grammar.len()
        );

        Ok(TrainingOutput {
            sequence: self.sequence,
            grammar: self.grammar,
            merges: self.merges,
            stop_reason,
        })
    }

    /// The grammar grown so far.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The current symbol sequence.
    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    /// The pair frequency table of the current sequence.
    pub fn table(&self) -> &PairFrequencyTable {
        &self.table
    }

    /// Merges performed so far.
    pub fn merges(&self) -> usize {
        self.merges
    }
}
