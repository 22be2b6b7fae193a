//! Plain-text vocabulary: one token per line, line number = token id.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tokenizers::Tokenizer;
use tracing::info;

/// Vocabulary (added tokens included) ordered by id.
///
/// Fails unless ids run contiguously from 0, since the device tokenizer
/// recovers ids from line numbers.
pub fn vocab_lines(tokenizer: &Tokenizer) -> anyhow::Result<Vec<String>> {
    let mut entries: Vec<(String, u32)> = tokenizer.get_vocab(true).into_iter().collect();
    entries.sort_by_key(|(_, id)| *id);

    for (line, (token, id)) in entries.iter().enumerate() {
        anyhow::ensure!(
            *id as usize == line,
            "vocabulary ids are not contiguous: token {token:?} has id {id}, expected {line}"
        );
    }

    Ok(entries.into_iter().map(|(token, _)| token).collect())
}

/// Write the vocabulary file, creating parent directories. Returns the token count.
pub fn write_vocab(tokenizer: &Tokenizer, path: &Path) -> anyhow::Result<usize> {
    let lines = vocab_lines(tokenizer)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(fs::File::create(path)?);
    for token in &lines {
        writeln!(out, "{token}")?;
    }
    out.flush()?;

    info!(tokens = lines.len(), path = %path.display(), "saved vocabulary");
    Ok(lines.len())
}
