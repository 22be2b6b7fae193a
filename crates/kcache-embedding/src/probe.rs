//! Fixed-length probe inputs for tracing the embedding model.

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::MAX_LENGTH;

/// Sentence encoded to trace the model.
pub const PROBE_SENTENCE: &str = "This is a test sentence.";

/// One `(input_ids, attention_mask)` pair, each exactly [`MAX_LENGTH`] long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInputs {
    /// Token ids, padded with the pad id.
    pub input_ids: Vec<i32>,
    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Vec<i32>,
}

impl ProbeInputs {
    /// Positions that hold real tokens.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

/// Encode [`PROBE_SENTENCE`] padded and truncated to [`MAX_LENGTH`].
pub fn probe_inputs(tokenizer: &Tokenizer) -> anyhow::Result<ProbeInputs> {
    let mut tokenizer = tokenizer.clone();
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_LENGTH,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::Fixed(MAX_LENGTH),
        ..Default::default()
    }));

    let encoding = tokenizer
        .encode(PROBE_SENTENCE, true)
        .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

    let input_ids: Vec<i32> = encoding.get_ids().iter().map(|&id| id as i32).collect();
    let attention_mask: Vec<i32> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i32)
        .collect();

    anyhow::ensure!(
        input_ids.len() == MAX_LENGTH && attention_mask.len() == MAX_LENGTH,
        "probe length {} != {MAX_LENGTH}",
        input_ids.len()
    );

    Ok(ProbeInputs {
        input_ids,
        attention_mask,
    })
}
