//! Concurrent fan-out of fetch descriptors.
//!
//! [`Dispatcher::run_all`] spawns one task per descriptor, all at once, and
//! waits for every one of them. Each task reports exactly one outcome to the
//! [`Aggregator`]; a failing or panicking task never affects its siblings.

use crate::aggregate::Aggregator;
use crate::error::FetchError;
use crate::fetch::decode::decode;
use crate::fetch::transport::{FetchRequest, Transport};
use crate::models::{FetchDescriptor, FetchOutcome};
use futures::future::join_all;
use reqwest::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs batches of descriptors and feeds their outcomes to an aggregator.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    aggregator: Aggregator,
    active_runs: Arc<AtomicUsize>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, aggregator: Aggregator) -> Self {
        Self {
            transport,
            aggregator,
            active_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The aggregator outcomes are recorded into.
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// True while any run has units that have not finished.
    pub fn is_in_flight(&self) -> bool {
        self.active_runs.load(Ordering::SeqCst) > 0
    }

    /// Execute every descriptor concurrently and wait for all of them.
    ///
    /// Returns once each descriptor's outcome has been recorded. If this
    /// future is dropped early the spawned units keep running, and the run
    /// stays in flight until the last of them has recorded its outcome.
    pub async fn run_all(&self, descriptors: Vec<FetchDescriptor>) {
        let in_flight = Arc::new(InFlight::enter(&self.active_runs));
        let start = Instant::now();
        let count = descriptors.len();
        info!("Dispatching {} requests", count);

        let units: Vec<_> = descriptors
            .into_iter()
            .map(|descriptor| {
                let transport = Arc::clone(&self.transport);
                let aggregator = self.aggregator.clone();
                let target = descriptor.target.clone();
                let classification = descriptor.classification;
                let in_flight = Arc::clone(&in_flight);
                let handle = tokio::spawn(async move {
                    let outcome = execute(transport.as_ref(), &descriptor).await;
                    log_outcome(&descriptor, &outcome);
                    aggregator.record(outcome, descriptor.classification).await;
                    drop(in_flight);
                });
                (target, classification, handle)
            })
            .collect();

        let joined = join_all(
            units
                .into_iter()
                .map(|(target, classification, handle)| async move {
                    (target, classification, handle.await)
                }),
        )
        .await;

        // A unit that died before reporting still counts as one failed request.
        for (target, classification, result) in joined {
            if let Err(e) = result {
                error!("Fetch task for {} aborted: {}", target, e);
                let outcome = Err(FetchError::transport(target, format!("task aborted: {e}")));
                self.aggregator.record(outcome, classification).await;
            }
        }

        info!(
            "All {} requests completed in {:.2}s",
            count,
            start.elapsed().as_secs_f64()
        );
        drop(in_flight);
    }
}

/// Execute a single descriptor: parse, send, decode.
pub async fn execute(transport: &dyn Transport, descriptor: &FetchDescriptor) -> FetchOutcome {
    let url = Url::parse(&descriptor.target).map_err(|e| FetchError::InvalidTarget {
        target: descriptor.target.clone(),
        reason: e.to_string(),
    })?;

    let request = FetchRequest {
        url,
        transport: descriptor.transport,
    };
    let response = transport.execute(&request).await?;
    debug!(
        "{}: status {} with {} bytes",
        descriptor.id,
        response.status,
        response.body.len()
    );

    decode(descriptor.payload, &descriptor.target, &response.body)
}

fn log_outcome(descriptor: &FetchDescriptor, outcome: &FetchOutcome) {
    match outcome {
        Ok(payload) => debug!(
            "{} ({}) produced {} {} record(s)",
            descriptor.id,
            descriptor.classification,
            payload.len(),
            payload.kind()
        ),
        Err(e) => warn!("{} failed ({}): {}", descriptor.id, e.kind(), e),
    }
}

/// Marks a run as active until dropped.
///
/// Shared between `run_all` and every unit it spawns, so the count only
/// drops once the last of them is done.
struct InFlight {
    active_runs: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(active_runs: &Arc<AtomicUsize>) -> Self {
        active_runs.fetch_add(1, Ordering::SeqCst);
        Self {
            active_runs: Arc::clone(active_runs),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.active_runs.fetch_sub(1, Ordering::SeqCst);
    }
}
