//! Train command implementation.

use clap::Parser;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training data file ("-" for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output directory for the trained grammar
    #[arg(short, long)]
    pub output: String,

    /// Stop after this many merges
    #[arg(long)]
    pub max_merges: Option<usize>,

    /// Minimum pair count for a merge
    #[arg(short, long, default_value_t = 2)]
    pub min_frequency: u64,

    /// Merges between progress lines (0 disables them)
    #[arg(long, default_value_t = 1000)]
    pub log_interval: usize,

    /// Check the pair table against the sequence after every merge
    #[arg(long, default_value_t = false)]
    pub verify: bool,

    /// Output format: binary or json
    #[arg(short, long, default_value = "binary")]
    pub format: ModelFormat,
}

use super::read_input;
use anyhow::{Context, Result as AnyhowResult};
use bpegram_tokenizer::{
    BpeTrainer, CancellationToken, ModelFormat, ModelSaver, StopReason, TrainingConfig,
    Vocabulary,
};
use log::{info, warn};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::path::Path;
use std::thread;
use std::time::Instant;

pub fn run(cmd: TrainCommand) -> AnyhowResult<()> {
    let mut builder = TrainingConfig::builder()
        .min_frequency(cmd.min_frequency)
        .log_interval(cmd.log_interval)
        .verify_invariants(cmd.verify);
    if let Some(max_merges) = cmd.max_merges {
        builder = builder.max_merges(max_merges);
    }
    let config = builder.build()?;

    let start = Instant::now();
    let data = read_input(&cmd.input)?;
    info!(
        "Read {} bytes from {} in {:.2}s",
        data.len(),
        cmd.input,
        start.elapsed().as_secs_f64()
    );

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone())?;

    let start = Instant::now();
    let output = BpeTrainer::from_bytes(config, &data)?.train(&cancel)?;
    info!(
        "Training finished in {:.2}s: {} merges, {} symbols ({:?})",
        start.elapsed().as_secs_f64(),
        output.merges,
        output.sequence.len(),
        output.stop_reason
    );
    if output.stop_reason == StopReason::Cancelled {
        warn!("Saving partial grammar after cancellation");
    }

    let vocab = Vocabulary::build(&output.grammar)?;
    ModelSaver::new(&output.grammar, &output.sequence)
        .with_vocabulary(&vocab)
        .save(Path::new(&cmd.output), cmd.format)?;

    println!(
        "{} rules, {} -> {} symbols, saved to {}",
        vocab.len(),
        data.len(),
        output.sequence.len(),
        cmd.output
    );

    Ok(())
}

/// Cancel training on SIGINT or SIGTERM.
///
/// The trainer stops at the next merge boundary and the partial grammar is
/// still saved.
fn spawn_signal_handler(cancel: CancellationToken) -> AnyhowResult<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])
        .context("failed to register signal handlers")?;
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            warn!("Received signal {}, stopping after the current merge", signal);
            cancel.cancel();
        }
    });
    Ok(())
}
