//! In-process rule book and the transport decorator that applies it.

use crate::error::FetchResult;
use crate::fetch::transport::{FetchRequest, RawResponse, Transport};
use crate::intercept::{Interceptor, MatchRule, Mock};
use async_trait::async_trait;
use reqwest::Url;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct Rules {
    suppressed: Vec<MatchRule>,
    mocks: Vec<Mock>,
}

/// Registered interception rules.
#[derive(Debug, Default)]
pub struct RuleBook {
    rules: RwLock<Rules>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently registered mock matching `url`.
    pub fn mock_for(&self, url: &Url) -> Option<Mock> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules.mocks.iter().rev().find(|m| m.rule.matches(url)).cloned()
    }

    pub fn is_suppressed(&self, url: &Url) -> bool {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        rules.suppressed.iter().any(|r| r.matches(url))
    }

    /// Number of registered (suppression, mock) rules.
    pub fn rule_counts(&self) -> (usize, usize) {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        (rules.suppressed.len(), rules.mocks.len())
    }
}

impl Interceptor for RuleBook {
    fn suppress_logging(&self, rule: MatchRule) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .suppressed
            .push(rule);
    }

    fn register_mock(&self, mock: Mock) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .mocks
            .push(mock);
    }
}

/// Wraps a transport: serves mocks, and logs traffic unless suppressed.
pub struct InterceptingTransport {
    inner: Arc<dyn Transport>,
    rules: Arc<RuleBook>,
}

impl InterceptingTransport {
    pub fn new(inner: Arc<dyn Transport>, rules: Arc<RuleBook>) -> Self {
        Self { inner, rules }
    }
}

#[async_trait]
impl Transport for InterceptingTransport {
    async fn execute(&self, request: &FetchRequest) -> FetchResult<RawResponse> {
        let logged = !self.rules.is_suppressed(&request.url);

        if let Some(mock) = self.rules.mock_for(&request.url) {
            if logged {
                info!(
                    "Mocked response for URL: {} status code: {}",
                    request.url, mock.status
                );
            }
            return Ok(RawResponse {
                status: mock.status,
                body: mock.body,
            });
        }

        let result = self.inner.execute(request).await;
        if logged {
            match &result {
                Ok(response) => info!(
                    "Received response for URL: {} status code: {}",
                    request.url, response.status
                ),
                Err(e) => warn!("Request to {} failed: {}", request.url, e),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::TransportKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and echoes a fixed body.
    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn execute(&self, request: &FetchRequest) -> FetchResult<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.url.host_str() == Some("down.example.com") {
                return Err(FetchError::transport(request.url.as_str(), "refused"));
            }
            Ok(RawResponse {
                status: 200,
                body: b"[]".to_vec(),
            })
        }
    }

    fn request(url: &str) -> FetchRequest {
        FetchRequest {
            url: Url::parse(url).unwrap(),
            transport: TransportKind::Shared,
        }
    }

    fn mock(url: &str, body: &str) -> Mock {
        Mock::json(MatchRule::url(url), &serde_json::json!({ "response": body }), 200).unwrap()
    }

    #[test]
    fn test_latest_mock_wins() {
        let book = RuleBook::new();
        book.register_mock(mock("https://mock.example.com/api/mock/1", "first"));
        book.register_mock(mock("https://mock.example.com/api/mock/1", "second"));

        let found = book
            .mock_for(&Url::parse("https://mock.example.com/api/mock/1").unwrap())
            .unwrap();
        assert_eq!(found.body, br#"{"response":"second"}"#.to_vec());
        assert_eq!(book.rule_counts(), (0, 2));
    }

    #[test]
    fn test_suppression_lookup() {
        let book = RuleBook::new();
        book.suppress_logging(MatchRule::url("https://jsonplaceholder.typicode.com/users"));
        assert!(book.is_suppressed(&Url::parse("https://jsonplaceholder.typicode.com/users").unwrap()));
        assert!(!book.is_suppressed(&Url::parse("https://jsonplaceholder.typicode.com/posts").unwrap()));
    }

    #[test]
    fn test_mock_short_circuits_inner_transport() {
        tokio_test::block_on(async {
            let inner = Arc::new(CountingTransport::default());
            let book = Arc::new(RuleBook::new());
            book.register_mock(mock("https://mock.example.com/api/mock/1", "canned"));
            let transport = InterceptingTransport::new(inner.clone(), book);

            let response = transport
                .execute(&request("https://mock.example.com/api/mock/1"))
                .await
                .unwrap();
            assert_eq!(response.status, 200);
            assert_eq!(response.body, br#"{"response":"canned"}"#.to_vec());
            assert_eq!(inner.calls.load(Ordering::SeqCst), 0);
        });
    }

    #[test]
    fn test_unmatched_requests_pass_through() {
        tokio_test::block_on(async {
            let inner = Arc::new(CountingTransport::default());
            let book = Arc::new(RuleBook::new());
            book.suppress_logging(MatchRule::url("https://jsonplaceholder.typicode.com/users"));
            let transport = InterceptingTransport::new(inner.clone(), book);

            let response = transport
                .execute(&request("https://jsonplaceholder.typicode.com/users"))
                .await
                .unwrap();
            assert_eq!(response.body, b"[]".to_vec());

            let err = transport
                .execute(&request("https://down.example.com/"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), "transport_failure");
            assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        });
    }
}
