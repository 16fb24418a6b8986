//! CLI commands for the bpegram tool.

pub mod decode;
pub mod encode;
pub mod render;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use render::RenderCommand;
pub use train::TrainCommand;

use anyhow::{Context, Result as AnyhowResult};
use std::io::Read;

/// Read a whole file, or stdin when `path` is "-".
pub(crate) fn read_input(path: &str) -> AnyhowResult<Vec<u8>> {
    if path == "-" {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path))
    }
}
