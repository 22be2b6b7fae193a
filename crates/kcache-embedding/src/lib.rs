//! Export side of the on-device sentence embedding model.
//!
//! The device runs all-MiniLM-L6-v2 with a fixed input of [`MAX_LENGTH`]
//! positions and tokenizes with a plain vocabulary file where the line
//! number is the token id. This crate writes that file from a
//! `tokenizer.json` and produces the fixed-length probe inputs used when the
//! model is traced for conversion. Tracing and conversion happen outside Rust.

mod probe;
mod vocab;

pub use probe::{probe_inputs, ProbeInputs, PROBE_SENTENCE};
pub use vocab::{vocab_lines, write_vocab};

use std::path::Path;

use tokenizers::Tokenizer;
use tracing::info;

/// Model the artifacts are produced for.
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Sequence length of the on-device model input.
pub const MAX_LENGTH: usize = 256;

/// Input names of the converted model, in order.
pub const INPUT_NAMES: [&str; 2] = ["input_ids", "attention_mask"];

/// Load a `tokenizer.json`.
pub fn load_tokenizer(path: &Path) -> anyhow::Result<Tokenizer> {
    anyhow::ensure!(path.exists(), "tokenizer not found at {}", path.display());

    let tokenizer =
        Tokenizer::from_file(path).map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

    info!(
        path = %path.display(),
        vocab_size = tokenizer.get_vocab_size(true),
        "loaded tokenizer"
    );
    Ok(tokenizer)
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Tokens written to the vocabulary file.
    pub vocab_size: usize,
    /// Non-padding positions in the probe input.
    pub probe_tokens: usize,
}

/// Write the vocabulary, then build the probe inputs.
///
/// The vocabulary always comes first so the device tokenizer has it even if
/// a later step fails.
pub fn export(tokenizer: &Tokenizer, vocab_path: &Path) -> anyhow::Result<ExportSummary> {
    let vocab_size = write_vocab(tokenizer, vocab_path)?;
    let probe = probe_inputs(tokenizer)?;

    Ok(ExportSummary {
        vocab_size,
        probe_tokens: probe.token_count(),
    })
}
