//! Render command implementation.

use clap::Parser;

/// Render command arguments.
#[derive(Parser)]
pub struct RenderCommand {
    /// Path to the trained model directory
    #[arg(short, long)]
    pub model: String,

    /// Also list every rule with its expansion
    #[arg(short, long, default_value_t = false)]
    pub rules: bool,
}

use anyhow::Result as AnyhowResult;
use bpegram_tokenizer::{render, ModelLoader};
use std::path::Path;

pub fn run(cmd: RenderCommand) -> AnyhowResult<()> {
    let model = ModelLoader::load(Path::new(&cmd.model))?;

    if cmd.rules {
        for (id, rule) in model.grammar.nonterminals() {
            let expansion = model.vocab.get(id).unwrap_or_default();
            println!(
                "{} -> {} {}  {}",
                id,
                rule.left,
                rule.right,
                render(expansion, &model.grammar)?
            );
        }
        println!();
    }

    println!("{}", render(&model.sequence, &model.grammar)?);

    Ok(())
}
