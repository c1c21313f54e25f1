//! # Scrapers Module
//!
//! - **`Scraper` trait**: the contract every metric-collection unit
//!   implements: one fixed query per invocation, samples streamed to a
//!   shared sink in a fixed per-row order.
//! - **`MemoryEventsScraper`**: memory usage aggregated by event from
//!   `performance_schema.memory_summary_global_by_event_name`.
//!
//! Scrapers hold no shared mutable state of their own; the harness runs
//! many of them concurrently, each on its own task, all writing to one
//! multi-producer sink. A scraper never closes the sink — that belongs
//! to whoever created it.

pub mod memory_events;

pub use memory_events::MemoryEventsScraper;

use crate::{
    error::ScrapeError,
    executor::QueryExecutor,
    metrics::Sample,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A unit that executes one fixed query and emits derived samples.
///
/// Every invocation starts fresh: no retries, no resumption. Failures
/// are returned, not swallowed; samples emitted before a failure stay
/// delivered.
pub trait Scraper: Send + Sync {
    /// Stable identifier used in logs and failure reports.
    fn name(&self) -> &'static str;

    /// One-line description of what the scraper collects.
    fn help(&self) -> &'static str;

    fn scrape<'a>(
        &'a self,
        executor: &'a dyn QueryExecutor,
        sink: &'a mpsc::Sender<Sample>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), ScrapeError>>;
}

/// The scrapers a default collection cycle runs.
pub fn default_set() -> Vec<Arc<dyn Scraper>> {
    vec![Arc::new(MemoryEventsScraper)]
}

/// Emit one sample, honoring sink backpressure. A hung-up receiver means
/// the cycle is being torn down.
pub(crate) async fn send(sink: &mpsc::Sender<Sample>, sample: Sample) -> Result<(), ScrapeError> {
    sink.send(sample).await.map_err(|_| ScrapeError::SinkClosed)
}
