//! Request interception: skip-logging rules and canned mock responses.
//!
//! The orchestrator only ever talks to the [`Interceptor`] trait, once, at
//! startup. [`RuleBook`] is the in-process implementation the binary uses,
//! and [`InterceptingTransport`] applies its rules to outgoing requests.

pub mod rules;

pub use rules::{InterceptingTransport, RuleBook};

use crate::config::{MockConfig, SkipLoggingConfig};
use crate::error::{FetchError, FetchResult};
use reqwest::Url;
use serde::Serialize;
use tracing::{info, warn};

/// Collaborator that accepts interception rules.
///
/// Registration is fire-and-forget; callers never query it back.
pub trait Interceptor: Send + Sync {
    /// Keep matching requests out of the request log.
    fn suppress_logging(&self, rule: MatchRule);

    /// Answer matching requests with a canned response.
    fn register_mock(&self, mock: Mock);
}

/// Predicate over an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// Exact URL match, compared in normalized form.
    Url(String),
}

impl MatchRule {
    pub fn url(url: &str) -> Self {
        let normalized = Url::parse(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        MatchRule::Url(normalized)
    }

    pub fn matches(&self, url: &Url) -> bool {
        match self {
            MatchRule::Url(expected) => expected == url.as_str(),
        }
    }
}

/// A canned response bound to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mock {
    pub rule: MatchRule,
    pub status: u16,
    pub body: Vec<u8>,
}

impl Mock {
    /// Build a mock whose body is `response` serialized as JSON.
    ///
    /// Fails with [`FetchError::ConfigurationError`] if the payload cannot be
    /// serialized or the status code is not a valid HTTP status.
    pub fn json<T: Serialize + ?Sized>(
        rule: MatchRule,
        response: &T,
        status: u16,
    ) -> FetchResult<Self> {
        if !(100..=599).contains(&status) {
            return Err(FetchError::ConfigurationError(format!(
                "invalid mock status code {status}"
            )));
        }
        let body = serde_json::to_vec(response).map_err(|e| {
            FetchError::ConfigurationError(format!("cannot serialize mock response: {e}"))
        })?;
        Ok(Self { rule, status, body })
    }
}

/// Register the configured rules with `interceptor`.
///
/// A mock that fails to build is logged and skipped; the remaining rules are
/// still registered. Returns the number of rules registered.
pub fn install(
    interceptor: &dyn Interceptor,
    skip_logging: &[SkipLoggingConfig],
    mocks: &[MockConfig],
) -> usize {
    let mut registered = 0;

    for skip in skip_logging {
        interceptor.suppress_logging(MatchRule::url(&skip.url));
        info!("Skip logging for {}", skip.url);
        registered += 1;
    }

    for mock in mocks {
        match Mock::json(MatchRule::url(&mock.url), &mock.response, mock.status) {
            Ok(built) => {
                interceptor.register_mock(built);
                info!("Mock registered for {} (status {})", mock.url, mock.status);
                registered += 1;
            }
            Err(e) => warn!("Mock for {} failed: {}", mock.url, e),
        }
    }

    registered
}
