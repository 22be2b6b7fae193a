//! Command-line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Turn page text on stdin into structured text for chunking.
///
/// Uses the hosted Gemini API when LANGEXTRACT_API_KEY or GOOGLE_API_KEY is
/// set, otherwise a local Ollama server.
#[derive(Debug, Parser)]
#[command(name = "extract-structured")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ~/.kcache/extract.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the selected model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override the local server endpoint
    #[arg(long)]
    pub model_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Write the embedding vocabulary and check the fixed-length model input.
#[derive(Debug, Parser)]
#[command(name = "export-vocab")]
#[command(version, about, long_about = None)]
pub struct ExportVocabCli {
    /// Path to the model's tokenizer.json
    #[arg(short, long)]
    pub tokenizer: PathBuf,

    /// Vocabulary output file (one token per line)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
