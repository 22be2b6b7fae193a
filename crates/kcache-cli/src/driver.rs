//! stdin → extraction → stdout.

use std::io::{Read, Write};

use kcache_domain::{normalize, ExtractionEngine};
use kcache_extractor::{
    invoke, truncate_chars, worked_example, BackendParams, Extractor, ExtractorConfig,
    ExtractorError,
};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Read all of `input` and return it trimmed. Empty input is an error.
pub fn read_input<R: Read>(mut input: R) -> Result<String> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    let text = raw.trim();
    if text.is_empty() {
        return Err(CliError::EmptyInput);
    }
    debug!(chars = text.chars().count(), "Read input");
    Ok(text.to_string())
}

/// Read the whole input, extract, and write structured text.
///
/// Empty input is an error and nothing is written. When extraction yields no
/// usable text the trimmed input is written instead, cut to
/// `config.max_fallback_chars`. No trailing newline is added.
pub async fn run<R, W, E>(input: R, output: W, engine: &E, config: &ExtractorConfig) -> Result<()>
where
    R: Read,
    W: Write,
    E: ExtractionEngine,
    E::Error: Into<ExtractorError>,
{
    let text = read_input(input)?;
    write_structured(&text, output, engine, config).await
}

/// Extract from already trimmed, non-empty `text` and write the result.
pub async fn write_structured<W, E>(
    text: &str,
    mut output: W,
    engine: &E,
    config: &ExtractorConfig,
) -> Result<()>
where
    W: Write,
    E: ExtractionEngine,
    E::Error: Into<ExtractorError>,
{
    let document = invoke(engine, text, &[worked_example()], config).await?;
    let structured = normalize(&document);

    if structured.trim().is_empty() {
        info!("No extractions, writing raw text");
        output.write_all(truncate_chars(text, config.max_fallback_chars).as_bytes())?;
    } else {
        output.write_all(structured.as_bytes())?;
    }
    output.flush()?;

    Ok(())
}

/// Full `extract-structured` flow for parsed arguments.
///
/// Input is read and checked before configuration is loaded, so empty input
/// reports as such whatever the state of the config file.
pub async fn execute<R, W>(cli: Cli, input: R, output: W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let text = read_input(input)?;

    let config = ExtractorConfig::load(cli.config.as_deref())
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut params = BackendParams::from_env();
    if let Some(model) = cli.model {
        params = params.with_model_id(model);
    }
    if let Some(url) = cli.model_url {
        params = params.with_model_url(url);
    }

    let provider = params.build_provider(&config);
    let extractor = Extractor::new(provider, params).with_config(config.clone());

    write_structured(&text, output, &extractor, &config).await
}
