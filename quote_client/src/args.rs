//! Command-line arguments for the Quote Client.
//!
//! This module defines the CLI interface using `clap`. Each flag falls back to an
//! environment variable and then to the default the client has always used.
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// URL of the quote server's endpoint.
    #[clap(long, env = "QUOTE_SERVER_URL", default_value = quote_common::net::DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Budget for the whole call, including reading the body, in milliseconds.
    #[clap(long, env = "QUOTE_CLIENT_TIMEOUT_MS", default_value_t = 300)]
    pub timeout_ms: u64,

    /// File the quote line is written to; overwritten on every run.
    #[clap(long, env = "QUOTE_OUTPUT", default_value = "cotacao.txt")]
    pub output: String,
}
