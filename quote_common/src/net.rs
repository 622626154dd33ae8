//! Shared networking defaults and helpers used by client and server.

/// The only path served by the quote server.
pub const QUOTE_PATH: &str = "/cotacao";
/// Address the server binds to unless configured otherwise.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
/// Where the client finds the server unless configured otherwise.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/cotacao";
/// Base URL of the upstream pricing API; the pair code is appended as a path segment.
pub const UPSTREAM_BASE_URL: &str = "https://economia.awesomeapi.com.br/json/last";
/// Currency pair requested from the upstream API.
pub const DEFAULT_PAIR: &str = "USD-BRL";

/// Upstream URL for `pair`, tolerating a trailing slash on `base`.
pub fn upstream_url(base: &str, pair: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_default_points_at_server_default() {
        let port = DEFAULT_BIND.rsplit(':').next().unwrap();
        assert!(DEFAULT_SERVER_URL.ends_with(&format!(":{}{}", port, QUOTE_PATH)));
    }

    #[test]
    fn upstream_url_joins_pair() {
        assert_eq!(
            upstream_url(UPSTREAM_BASE_URL, DEFAULT_PAIR),
            "https://economia.awesomeapi.com.br/json/last/USD-BRL"
        );
        assert_eq!(
            upstream_url("http://127.0.0.1:9999/json/last/", "EUR-BRL"),
            "http://127.0.0.1:9999/json/last/EUR-BRL"
        );
    }
}
