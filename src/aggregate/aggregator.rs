//! Shared result state and its single writer.
//!
//! Every fetch unit hands its outcome to [`Aggregator::record`]; nothing else
//! mutates [`AggregateState`]. The whole state sits behind one async mutex, so
//! a reader never observes a half-applied record.

use crate::models::{
    Character, Classification, FetchOutcome, House, ImageItem, MockResponse, Payload,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Accumulated results of one or more runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateState {
    pub characters: Vec<Character>,
    pub houses: Vec<House>,
    pub images: Vec<ImageItem>,
    pub mock_responses: Vec<MockResponse>,
    /// One per completed fetch, success or failure.
    pub total_requests: usize,
    /// One per fetch classified as skipped, success or failure.
    pub skipped_requests: usize,
    /// One per failed fetch.
    pub failed_requests: usize,
}

impl AggregateState {
    /// Whether anything observable has been collected.
    pub fn has_data(&self) -> bool {
        !self.characters.is_empty()
            || !self.houses.is_empty()
            || !self.images.is_empty()
            || !self.mock_responses.is_empty()
            || self.skipped_requests > 0
    }

    /// Completed fetches that produced a payload (possibly an empty one).
    pub fn successful_requests(&self) -> usize {
        self.total_requests - self.failed_requests
    }

    fn apply(&mut self, outcome: FetchOutcome, classification: Classification) {
        self.total_requests += 1;

        match outcome {
            Ok(Payload::Characters(characters)) => self.characters.extend(characters),
            Ok(Payload::Houses(houses)) => self.houses.extend(houses),
            Ok(Payload::Images(images)) => self.images.extend(images),
            Ok(Payload::Mock(mock)) => self.mock_responses.push(mock),
            Ok(Payload::None) => {}
            Err(_) => self.failed_requests += 1,
        }

        if classification == Classification::Skipped {
            self.skipped_requests += 1;
        }
    }
}

/// Cloneable handle to the shared [`AggregateState`].
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    state: Arc<Mutex<AggregateState>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one fetch.
    ///
    /// Always counts the fetch as completed. Successful payloads are appended
    /// to the collection matching their shape; failures append nothing.
    pub async fn record(&self, outcome: FetchOutcome, classification: Classification) {
        let mut state = self.state.lock().await;
        state.apply(outcome, classification);
        debug!(
            "Recorded outcome #{} ({} failed, {} skipped)",
            state.total_requests, state.failed_requests, state.skipped_requests
        );
    }

    /// A consistent copy of the current state.
    pub async fn snapshot(&self) -> AggregateState {
        self.state.lock().await.clone()
    }

    /// Run `f` against the current state without cloning it.
    pub async fn inspect<R>(&self, f: impl FnOnce(&AggregateState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }
}
