//! Quote Client — asks the quote server for the current dollar rate once and writes
//! the bid to a local file as `Dólar:<bid>`.
//!
//! Usage example (CLI):
//! ```bash
//! quote_client --server-url http://localhost:8080/cotacao --output ./cotacao.txt
//! ```
//!
//! Exit behaviour is decided in one place, `main`:
//! - success: the file is written, exit code 0;
//! - the server does not answer within the budget: a warning is logged, no file is
//!   created, exit code 0;
//! - anything else (bad URL, transport, decode or file error): logged, exit code 1.
#![warn(missing_docs)]
mod args;
mod fetch;
mod output;

use crate::args::Args;
use clap::Parser;
use log::{error, info, warn};
use quote_common::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Fetch the bid and write it to the configured file; returns the file path.
async fn run(args: &Args) -> Result<PathBuf> {
    let bid = fetch::fetch_bid(&args.server_url, Duration::from_millis(args.timeout_ms)).await?;
    let path = PathBuf::from(&args.output);
    output::write_quote_file(&path, &bid)?;
    Ok(path)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    match run(&args).await {
        Ok(path) => {
            info!("Quote written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) if e.is_timeout() => {
            warn!(
                "Timed out: the quote server did not answer within {}ms, nothing was written",
                args.timeout_ms
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Quote client failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
