//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained model directory
    #[arg(short, long)]
    pub model: String,

    /// Symbol ids to decode (comma or whitespace separated)
    #[arg(short, long)]
    pub ids: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use anyhow::{Context, Result as AnyhowResult};
use bpegram_tokenizer::Tokenizer;
use std::io::Write;
use std::path::Path;

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(Path::new(&cmd.model))?;

    let ids = parse_ids(&cmd.ids)?;
    let bytes = tokenizer.decode(&ids)?;

    match &cmd.output {
        Some(path) => std::fs::write(path, &bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn parse_ids(raw: &str) -> AnyhowResult<Vec<u32>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid symbol id {:?}", s))
        })
        .collect()
}
