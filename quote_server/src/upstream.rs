//! Client for the upstream pricing API.
//!
//! One `GET {base}/{pair}` per call, bounded by a single budget that covers
//! connecting, the response headers and the body. Nothing is retried.
use std::time::Duration;

use log::debug;
use quote_common::quote::decode_upstream;
use quote_common::{Quote, QuoteError, Result};
use reqwest::Client;
use reqwest::header::ACCEPT;
use tokio::time::timeout;

/// Upstream fetcher shared by all requests.
pub struct UpstreamClient {
    http: Client,
    url: String,
    pair: String,
    budget: Duration,
}

impl UpstreamClient {
    /// Build a fetcher for `pair` under `base_url`, with `budget` per call.
    pub fn new(base_url: &str, pair: &str, budget: Duration) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            url: quote_common::net::upstream_url(base_url, pair),
            pair: pair.to_string(),
            budget,
        })
    }

    /// Full URL requested on each fetch.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the current quote.
    ///
    /// The response status is not checked; the body alone decides the outcome.
    /// Deadline expiry is reported as `QuoteError::Timeout`; transport and
    /// decode failures keep their own variants.
    pub async fn fetch(&self) -> Result<Quote> {
        match timeout(self.budget, self.request()).await {
            Ok(result) => result,
            Err(_) => Err(QuoteError::Timeout(format!(
                "upstream call exceeded {}ms",
                self.budget.as_millis()
            ))),
        }
    }

    async fn request(&self) -> Result<Quote> {
        debug!("GET {}", self.url);
        let body = self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .bytes()
            .await?;
        decode_upstream(&body, &self.pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.30","low":"5.20","varBid":"0.01","pctChange":"0.2","bid":"5.25","ask":"5.26","timestamp":"1717012799","create_date":"2024-05-29 16:59:59"}}"#;

    async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/last/USD-BRL"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn client_for(server: &MockServer, budget_ms: u64) -> UpstreamClient {
        let base = format!("{}/json/last", server.uri());
        UpstreamClient::new(&base, "USD-BRL", Duration::from_millis(budget_ms)).unwrap()
    }

    #[tokio::test]
    async fn fetch_decodes_pair() {
        let server = create_mock_server(ResponseTemplate::new(200).set_body_string(BODY)).await;
        let client = client_for(&server, 200);

        let quote = client.fetch().await.unwrap();
        assert_eq!(quote.bid, "5.25");
        assert_eq!(quote.codein, "BRL");
        assert_eq!(quote.id, 0);
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = create_mock_server(
            ResponseTemplate::new(200)
                .set_body_string(BODY)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let client = client_for(&server, 200);

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, QuoteError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn json_error_status_decodes_to_empty_quote() {
        let server = create_mock_server(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"status":429,"code":"QuotaExceeded","message":"Too many requests"}"#),
        )
        .await;
        let client = client_for(&server, 200);

        let quote = client.fetch().await.unwrap();
        assert_eq!(quote, Quote::default());
    }

    #[tokio::test]
    async fn empty_error_body_is_a_decode_failure() {
        let server = create_mock_server(ResponseTemplate::new(503)).await;
        let client = client_for(&server, 200);

        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, QuoteError::SerdeJson(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn wrong_pair_in_payload_yields_empty_fields() {
        let server = create_mock_server(
            ResponseTemplate::new(200).set_body_string(r#"{"EURBRL":{"bid":"6.0"}}"#),
        )
        .await;
        let client = client_for(&server, 200);

        let quote = client.fetch().await.unwrap();
        assert_eq!(quote.bid, "");
        assert_eq!(quote.code, "");
    }

    #[test]
    fn url_appends_pair() {
        let client = UpstreamClient::new(
            "https://economia.awesomeapi.com.br/json/last",
            "USD-BRL",
            Duration::from_millis(200),
        )
        .unwrap();
        assert_eq!(client.url(), "https://economia.awesomeapi.com.br/json/last/USD-BRL");
    }
}
