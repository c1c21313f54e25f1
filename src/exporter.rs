//! One-shot collection harness.
//!
//! Spawns every scraper on its own task, all writing to one bounded
//! multi-producer sink, and drains the sink into an ordered batch. The
//! harness owns the sink's lifecycle; scrapers only write to it. There
//! is no scheduling and no retrying here: one call, one cycle.

use crate::{
    error::ScrapeError,
    executor::QueryExecutor,
    metrics::Sample,
    scrapers::Scraper,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    error,
};

const DEFAULT_SINK_CAPACITY: usize = 256;

/// One scraper's failure within a cycle.
#[derive(Debug)]
pub struct ScrapeFailure {
    pub scraper: &'static str,
    pub error: ScrapeError,
}

/// Everything one collection cycle produced.
///
/// Samples keep per-scraper emission order; there is no ordering
/// guarantee across scrapers. A scraper that failed mid-way still has
/// its already-emitted samples in the batch.
#[derive(Debug)]
pub struct ScrapeReport {
    pub samples: Vec<Sample>,
    pub failures: Vec<ScrapeFailure>,
}

impl ScrapeReport {
    /// Failures that are not part of a routine teardown.
    pub fn structural_failures(&self) -> impl Iterator<Item = &ScrapeFailure> {
        self.failures.iter().filter(|f| !f.error.is_cancelled())
    }
}

/// Runs a set of scrapers against one query executor.
pub struct Exporter {
    scrapers: Vec<Arc<dyn Scraper>>,
    sink_capacity: usize,
}

impl Exporter {
    pub fn new(scrapers: Vec<Arc<dyn Scraper>>) -> Self {
        Self {
            scrapers,
            sink_capacity: DEFAULT_SINK_CAPACITY,
        }
    }

    pub fn with_sink_capacity(mut self, sink_capacity: usize) -> Self {
        self.sink_capacity = sink_capacity.max(1);
        self
    }

    /// Run every scraper once and drain the shared sink.
    ///
    /// Cancelling `cancel` aborts in-flight queries; the affected
    /// scrapers report a cancellation-kind failure, which is logged
    /// below error severity.
    pub async fn collect_once(
        &self,
        executor: Arc<dyn QueryExecutor>,
        cancel: CancellationToken,
    ) -> ScrapeReport {
        let (tx, mut rx) = mpsc::channel::<Sample>(self.sink_capacity);

        let mut tasks = Vec::with_capacity(self.scrapers.len());
        for scraper in &self.scrapers {
            let scraper = Arc::clone(scraper);
            let executor = Arc::clone(&executor);
            let tx = tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                let result = scraper.scrape(executor.as_ref(), &tx, &cancel).await;
                (scraper.name(), result)
            }));
        }
        // Closing the sink is the harness's job; the drain below ends
        // once every scraper has dropped its sender.
        drop(tx);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }

        let mut failures = Vec::new();
        for task in tasks {
            match task.await {
                Ok((name, Ok(()))) => debug!(scraper = name, "scrape finished"),
                Ok((name, Err(err))) if err.is_cancelled() => {
                    debug!(scraper = name, reason = %err, "scrape stopped during teardown");
                    failures.push(ScrapeFailure {
                        scraper: name,
                        error: err,
                    });
                }
                Ok((name, Err(err))) => {
                    error!(scraper = name, error = %err, "scrape failed");
                    failures.push(ScrapeFailure {
                        scraper: name,
                        error: err,
                    });
                }
                Err(join_error) => {
                    error!(error = %join_error, "scraper task panicked");
                }
            }
        }

        ScrapeReport { samples, failures }
    }
}
