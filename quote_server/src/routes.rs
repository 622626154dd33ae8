//! HTTP surface of the quote server.
//!
//! Only `GET /cotacao` is routed. Each request fetches a fresh quote from the
//! upstream API, stores it, and answers with the stored record as JSON. The
//! upstream call and the storage write each get their own budget; the storage
//! budget starts when the fetch has finished.
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::{debug, error, info};
use quote_common::net::QUOTE_PATH;
use quote_common::{Quote, QuoteError};
use thiserror::Error;
use tokio::time::{Instant, timeout_at};

use crate::storage::QuoteStore;
use crate::upstream::UpstreamClient;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    upstream: Arc<UpstreamClient>,
    store: Arc<dyn QuoteStore>,
    storage_budget: Duration,
}

impl AppState {
    /// Bundle the upstream fetcher, the store and the per-request storage budget.
    pub fn new(
        upstream: UpstreamClient,
        store: Arc<dyn QuoteStore>,
        storage_budget: Duration,
    ) -> Self {
        Self {
            upstream: Arc::new(upstream),
            store,
            storage_budget,
        }
    }
}

/// Failure of one stage of `/cotacao`; every variant answers 500.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The upstream call failed or ran out of time. Details stay in the log.
    #[error("failed to fetch quote")]
    Upstream(#[source] QuoteError),

    /// The storage write failed or ran out of time.
    #[error("failed to save quote: {0}")]
    Storage(#[source] QuoteError),

    /// The stored record could not be turned into a response body.
    #[error("failed to process response")]
    Encode(#[source] QuoteError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(e) => error!("Upstream fetch failed: {}", e),
            ApiError::Storage(e) => error!("Saving quote failed: {}", e),
            ApiError::Encode(e) => error!("Encoding quote failed: {}", e),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(QUOTE_PATH, get(get_quote))
        .fallback(not_found)
        .with_state(state)
}

/// `GET /cotacao`. The fetch and the write run on their own task and finish
/// even if the caller hangs up.
async fn get_quote(State(state): State<AppState>) -> Response {
    match tokio::spawn(fetch_and_store(state)).await {
        Ok(Ok(quote)) => encode(&quote),
        Ok(Err(e)) => e.into_response(),
        Err(e) => ApiError::Encode(QuoteError::Format(e.to_string())).into_response(),
    }
}

async fn fetch_and_store(state: AppState) -> Result<Quote, ApiError> {
    let quote = state.upstream.fetch().await.map_err(ApiError::Upstream)?;

    let deadline = Instant::now() + state.storage_budget;
    let id = match timeout_at(deadline, state.store.insert(&quote, deadline)).await {
        Ok(result) => result,
        Err(_) => Err(QuoteError::Timeout("database deadline exceeded".into())),
    }
    .map_err(ApiError::Storage)?;

    info!("Stored quote {} {}-{} bid={}", id, quote.code, quote.codein, quote.bid);
    Ok(quote.with_id(id))
}

fn encode(quote: &Quote) -> Response {
    match quote.to_json_bytes() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => ApiError::Encode(e).into_response(),
    }
}

async fn not_found(uri: Uri) -> StatusCode {
    debug!("No route for {}", uri);
    StatusCode::NOT_FOUND
}
