//! bpegram CLI - train byte-pair grammars and tokenize with them.
//!
//! This is the main entry point for the `bpegram` command-line tool.

mod commands;

use clap::{Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, RenderCommand, TrainCommand};

#[derive(Parser)]
#[command(name = "bpegram")]
#[command(about = "Byte-pair grammar compression and tokenization", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every progress line (sets the default level to debug)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a grammar from a byte file
    Train(TrainCommand),
    /// Encode bytes to symbol ids
    Encode(EncodeCommand),
    /// Decode symbol ids back to bytes
    Decode(DecodeCommand),
    /// Print the trained sequence of a model
    Render(RenderCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Render(cmd) => commands::render::run(cmd)?,
    }

    Ok(())
}
