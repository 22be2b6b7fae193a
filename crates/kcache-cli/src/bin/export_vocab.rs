//! export-vocab - write the device tokenizer vocabulary from a tokenizer.json.
//!
//! Tracing and Core ML conversion of the model run outside this tool; the
//! vocabulary is always written first so the device has it either way.

use anyhow::Context;
use clap::Parser;
use kcache_cli::{init_tracing, ExportVocabCli};
use kcache_embedding::{export, load_tokenizer, DEFAULT_MODEL, INPUT_NAMES, MAX_LENGTH};

fn main() {
    let cli = ExportVocabCli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("export-vocab: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &ExportVocabCli) -> anyhow::Result<()> {
    println!("Loading tokenizer for {}...", DEFAULT_MODEL);
    let tokenizer = load_tokenizer(&cli.tokenizer)?;

    let summary = export(&tokenizer, &cli.output)
        .with_context(|| format!("export to {}", cli.output.display()))?;

    println!(
        "Saved vocabulary ({} tokens) to {}",
        summary.vocab_size,
        cli.output.display()
    );
    println!(
        "Probe input: {} x {} ({} tokens)",
        INPUT_NAMES.join(", "),
        MAX_LENGTH,
        summary.probe_tokens
    );
    Ok(())
}
