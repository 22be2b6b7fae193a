//! extract-structured - page text on stdin, structured text on stdout.

use std::io;

use clap::Parser;
use kcache_cli::{driver, init_tracing, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = driver::execute(cli, io::stdin().lock(), io::stdout().lock()).await {
        eprintln!("extract-structured: {}", e);
        std::process::exit(1);
    }
}
