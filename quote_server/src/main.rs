//! Quote HTTP server.
//!
//! Serves `GET /cotacao`: on every request it fetches the latest exchange rate from
//! the upstream pricing API, stores it in MySQL and returns the stored record as JSON.
//! Building blocks:
//!
//! - `UpstreamClient` — one bounded `GET` against the pricing API per request.
//! - `MySqlStore` — a connection pool opened once at startup; each request inserts one
//!   row under its own, independent deadline.
//! - `routes` — the axum router, mapping each failing stage to a 500 response.
//!
//! Shutdown: Ctrl+C stops accepting connections, lets in-flight requests finish and
//! then closes the pool.
#![warn(missing_docs)]
use crate::args::Args;
use crate::routes::AppState;
use crate::storage::{MySqlStore, QuoteStore};
use crate::upstream::UpstreamClient;
use clap::Parser;
use log::{error, info};
use quote_common::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

mod args;
mod routes;
mod storage;
mod upstream;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let upstream = UpstreamClient::new(
        &args.upstream_url,
        &args.pair,
        Duration::from_millis(args.upstream_timeout_ms),
    )?;
    info!("Upstream source: {}", upstream.url());

    let store = Arc::new(MySqlStore::connect(&args.database_url, args.max_connections).await?);
    let shared_store: Arc<dyn QuoteStore> = store.clone();
    let state = AppState::new(
        upstream,
        shared_store,
        Duration::from_millis(args.storage_timeout_ms),
    );

    let listener = TcpListener::bind(&args.bind).await?;
    info!("Server up on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Ctrl+C received. Shutting down server...");
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
