//! Retrieval of the current bid from the quote server.
use std::time::Duration;

use log::debug;
use quote_common::{QuoteError, Result};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::time::timeout;

/// The one field the client reads from the server's record.
///
/// The server spells it `Bid`; the lowercase form is accepted too.
#[derive(Debug, Deserialize)]
struct BidOnly {
    #[serde(rename = "bid", alias = "Bid", default)]
    bid: String,
}

/// `GET url` with `Accept: application/json` and return the decoded bid.
///
/// `budget` bounds the request and the body read together. Running out of time
/// yields `QuoteError::Timeout`.
pub async fn fetch_bid(url: &str, budget: Duration) -> Result<String> {
    match timeout(budget, request(url)).await {
        Ok(result) => result,
        Err(_) => Err(QuoteError::Timeout(format!(
            "quote server did not answer within {}ms",
            budget.as_millis()
        ))),
    }
}

async fn request(url: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let body = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .bytes()
        .await?;
    debug!("Server answered {} bytes", body.len());
    let parsed: BidOnly = serde_json::from_slice(&body)?;
    Ok(parsed.bid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cotacao"))
            .and(header("accept", "application/json"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn reads_lowercase_bid() {
        let server = create_mock_server(
            ResponseTemplate::new(200).set_body_string(r#"{"bid": "5.25", "ask": "5.26"}"#),
        )
        .await;

        let bid = fetch_bid(&format!("{}/cotacao", server.uri()), Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(bid, "5.25");
    }

    #[tokio::test]
    async fn reads_server_spelling() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"ID": 3, "Code": "USD", "Bid": "5.2580", "Ask": "5.2590"}"#),
        )
        .await;

        let bid = fetch_bid(&format!("{}/cotacao", server.uri()), Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(bid, "5.2580");
    }

    #[tokio::test]
    async fn slow_server_is_a_timeout() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"bid": "5.25"}"#)
                .set_delay(Duration::from_millis(600)),
        )
        .await;

        let err = fetch_bid(&format!("{}/cotacao", server.uri()), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got {err:?}");
    }

    #[tokio::test]
    async fn plain_text_error_body_fails_to_decode() {
        let server = create_mock_server(
            ResponseTemplate::new(500).set_body_string("failed to fetch quote"),
        )
        .await;

        let err = fetch_bid(&format!("{}/cotacao", server.uri()), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::SerdeJson(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_url_is_not_a_timeout() {
        let err = fetch_bid("not a url", Duration::from_millis(300)).await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(matches!(err, QuoteError::Http(_)), "got {err:?}");
    }
}
