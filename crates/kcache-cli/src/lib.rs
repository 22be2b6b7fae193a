//! KnowledgeCache command-line tools.
//!
//! `extract-structured` reads page text on stdin and writes structured text
//! (or the raw text as a fallback) on stdout. `export-vocab` writes the
//! embedding vocabulary file for the device tokenizer.

pub mod cli;
pub mod driver;
pub mod error;

pub use cli::{Cli, ExportVocabCli};
pub use error::{CliError, Result};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
