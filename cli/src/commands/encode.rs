//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained model directory
    #[arg(short, long)]
    pub model: String,

    /// File to encode ("-" for stdin)
    #[arg(short, long)]
    pub input: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::read_input;
use anyhow::Result as AnyhowResult;
use bpegram_tokenizer::Tokenizer;
use std::path::Path;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = Tokenizer::load(Path::new(&cmd.model))?;
    let data = read_input(&cmd.input)?;

    let encoding = tokenizer.encode(&data)?;

    let ids_str: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!(
                "Encoded {} bytes to {} tokens in {}",
                data.len(),
                encoding.len(),
                path
            );
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
