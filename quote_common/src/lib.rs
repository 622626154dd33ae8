//!
//! Common types and utilities shared by the quote server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `QuoteError` used across the workspace.
//! - `result` — handy `Result<T, QuoteError>` alias.
//! - `quote` — the `Quote` record and upstream payload decoding.
//! - `net` — networking defaults and URL helpers.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod quote;
pub mod net;

pub use error::QuoteError;
pub use result::Result;
pub use quote::Quote;
