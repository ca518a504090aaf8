//! Data models for the fetch orchestrator.
//!
//! This module contains the payload records served by the public APIs,
//! the descriptors that declare a unit of fetch work, and the outcomes
//! those units produce.

use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A character from the Ice and Fire API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub url: String,
    pub name: String,
    pub gender: String,
    pub culture: String,
    pub born: String,
    pub died: String,
    pub titles: Vec<String>,
    pub aliases: Vec<String>,
    pub played_by: Vec<String>,
}

impl Character {
    /// Name to show for the character.
    ///
    /// Many records in the API have an empty name and are only known by an
    /// alias, so this falls back to the first alias before giving up.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.aliases.first() {
            Some(alias) if !alias.is_empty() => alias,
            _ => "Unknown Character",
        }
    }
}

/// A house from the Ice and Fire API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub url: String,
    pub name: String,
    pub region: String,
    pub coat_of_arms: String,
    pub words: String,
    pub titles: Vec<String>,
    pub seats: Vec<String>,
    pub founded: String,
    pub died_out: String,
}

/// An entry of the picsum image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: String,
    pub download_url: String,
}

/// Body of a canned mock response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    pub response: String,
}

/// Shape a descriptor expects its response body to decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// A JSON array of characters.
    Characters,
    /// A JSON array of houses.
    Houses,
    /// A JSON array of image items.
    Images,
    /// A single `{"response": ...}` object.
    Mock,
    /// The body is fetched but never inspected.
    None,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Characters => write!(f, "characters"),
            PayloadKind::Houses => write!(f, "houses"),
            PayloadKind::Images => write!(f, "images"),
            PayloadKind::Mock => write!(f, "mock"),
            PayloadKind::None => write!(f, "none"),
        }
    }
}

/// How the caller expects the interception layer to treat a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    #[default]
    Normal,
    /// Expected to be hidden from the interception log; counted separately.
    Skipped,
    /// Expected to be answered by a registered mock.
    MockRouted,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Normal => write!(f, "normal"),
            Classification::Skipped => write!(f, "skipped"),
            Classification::MockRouted => write!(f, "mock-routed"),
        }
    }
}

/// Which HTTP client configuration executes the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// The process-wide shared client.
    #[default]
    Shared,
    /// A client built for this request alone.
    Configured,
}

/// One declared unit of fetch work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchDescriptor {
    pub id: String,
    pub target: String,
    pub payload: PayloadKind,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default)]
    pub transport: TransportKind,
}

impl FetchDescriptor {
    /// Creates a normal descriptor on the shared transport.
    pub fn new(id: impl Into<String>, target: impl Into<String>, payload: PayloadKind) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            payload,
            classification: Classification::Normal,
            transport: TransportKind::Shared,
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Characters(Vec<Character>),
    Houses(Vec<House>),
    Images(Vec<ImageItem>),
    Mock(MockResponse),
    None,
}

impl Payload {
    /// The kind this payload satisfies.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Characters(_) => PayloadKind::Characters,
            Payload::Houses(_) => PayloadKind::Houses,
            Payload::Images(_) => PayloadKind::Images,
            Payload::Mock(_) => PayloadKind::Mock,
            Payload::None => PayloadKind::None,
        }
    }

    /// Number of records carried.
    pub fn len(&self) -> usize {
        match self {
            Payload::Characters(v) => v.len(),
            Payload::Houses(v) => v.len(),
            Payload::Images(v) => v.len(),
            Payload::Mock(_) => 1,
            Payload::None => 0,
        }
    }
}

/// Terminal result of executing one descriptor.
pub type FetchOutcome = Result<Payload, FetchError>;
