//! Exchange-rate quote record and the upstream payload it is built from.
//!
//! The upstream pricing API answers with an object keyed by the pair code
//! (`{"USDBRL": {...}}`); every value inside is text and is carried through
//! unmodified. [`Quote`] is what the server stores and returns to its callers.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::Result;

/// Pair object as sent by the upstream API.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamQuote {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    pub var_bid: String,
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    #[serde(rename = "create_date")]
    pub create_date: String,
}

/// Exchange-rate record persisted by the server and returned as JSON.
///
/// Field names on the wire are `ID`, `Code`, `Codein`, ... `CreateDate`.
/// `id` stays `0` until storage assigns one.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Quote {
    #[serde(rename = "ID")]
    pub id: u64,
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    pub var_bid: String,
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

impl From<UpstreamQuote> for Quote {
    fn from(q: UpstreamQuote) -> Self {
        Quote {
            id: 0,
            code: q.code,
            codein: q.codein,
            name: q.name,
            high: q.high,
            low: q.low,
            var_bid: q.var_bid,
            pct_change: q.pct_change,
            bid: q.bid,
            ask: q.ask,
            timestamp: q.timestamp,
            create_date: q.create_date,
        }
    }
}

impl Quote {
    /// Returns the record with the storage-assigned identifier attached.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Encode the quote to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;
        Ok(json)
    }
}

/// Envelope key used by the upstream API for `pair` (`USD-BRL` -> `USDBRL`).
pub fn pair_key(pair: &str) -> String {
    pair.chars().filter(|c| *c != '-').collect::<String>().to_uppercase()
}

/// Decode an upstream body and extract the record for `pair`.
///
/// Only the shape is checked: the body must be a JSON object and the pair entry,
/// when present, an object of strings. An envelope without the pair (an API error
/// body, say) yields a record with every field empty.
pub fn decode_upstream(body: &[u8], pair: &str) -> Result<Quote> {
    let mut envelope: Map<String, Value> = serde_json::from_slice(body)?;
    let upstream = match envelope.remove(&pair_key(pair)) {
        None | Some(Value::Null) => UpstreamQuote::default(),
        Some(value) => serde_json::from_value(value)?,
    };
    Ok(upstream.into())
}
