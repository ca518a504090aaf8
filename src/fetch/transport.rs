//! HTTP transport boundary.
//!
//! A [`Transport`] turns a request into raw status and body bytes. It never
//! looks at the status code; decoding happens later regardless of it.

use crate::error::{FetchError, FetchResult};
use crate::models::TransportKind;
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    pub transport: TransportKind,
}

/// Status and body of a response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Executes requests against the network (or something standing in for it).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &FetchRequest) -> FetchResult<RawResponse>;
}

/// reqwest-backed transport.
///
/// [`TransportKind::Shared`] requests reuse one pooled client;
/// [`TransportKind::Configured`] requests get a freshly built client each.
pub struct HttpTransport {
    shared: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> FetchResult<Self> {
        Ok(Self {
            shared: build_client()?,
        })
    }

    fn client_for(&self, kind: TransportKind) -> FetchResult<reqwest::Client> {
        match kind {
            TransportKind::Shared => Ok(self.shared.clone()),
            TransportKind::Configured => build_client(),
        }
    }
}

fn build_client() -> FetchResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("netspect/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::ConfigurationError(format!("failed to build HTTP client: {e}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &FetchRequest) -> FetchResult<RawResponse> {
        let client = self.client_for(request.transport)?;
        debug!("GET {} via {:?} client", request.url, request.transport);

        let response = client
            .get(request.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(request.url.as_str(), describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(request.url.as_str(), describe(&e)))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_connect() {
        format!("cannot connect: {e}")
    } else if e.is_timeout() {
        format!("timed out: {e}")
    } else if e.is_body() || e.is_decode() {
        format!("failed to read body: {e}")
    } else {
        e.to_string()
    }
}
