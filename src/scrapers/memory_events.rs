//! Memory usage statistics aggregated by event, from
//! `performance_schema.memory_summary_global_by_event_name`.
//!
//! Each row becomes exactly three samples sharing the row's
//! `event_name` label, emitted in a fixed order: allocated-bytes
//! counter, freed-bytes counter, currently-used gauge.

use crate::{
    error::ScrapeError,
    executor::QueryExecutor,
    metrics::Sample,
    scrapers::{
        send,
        Scraper,
    },
};
use futures::{
    future::BoxFuture,
    TryStreamExt,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Column order is part of the contract; the row decoder assumes
/// exactly this shape.
pub const MEMORY_EVENTS_QUERY: &str = "\
SELECT EVENT_NAME, SUM_NUMBER_OF_BYTES_ALLOC, SUM_NUMBER_OF_BYTES_FREE, CURRENT_NUMBER_OF_BYTES_USED \
FROM performance_schema.memory_summary_global_by_event_name";

const COL_EVENT_NAME: &str = "EVENT_NAME";
const COL_BYTES_ALLOC: &str = "SUM_NUMBER_OF_BYTES_ALLOC";
const COL_BYTES_FREE: &str = "SUM_NUMBER_OF_BYTES_FREE";
const COL_BYTES_USED: &str = "CURRENT_NUMBER_OF_BYTES_USED";

const ALLOC_BYTES_NAME: &str = "mysql_perf_schema_memory_events_alloc_bytes_total";
const ALLOC_BYTES_HELP: &str = "The total number of bytes allocated by events.";
const FREE_BYTES_NAME: &str = "mysql_perf_schema_memory_events_free_bytes_total";
const FREE_BYTES_HELP: &str = "The total number of bytes freed by events.";
const USED_BYTES_NAME: &str = "mysql_perf_schema_memory_events_used_bytes";
const USED_BYTES_HELP: &str = "The number of bytes currently allocated by events.";

pub struct MemoryEventsScraper;

impl Scraper for MemoryEventsScraper {
    fn name(&self) -> &'static str {
        "perf_schema.memory_events"
    }

    fn help(&self) -> &'static str {
        "Collect memory usage by event from performance_schema.memory_summary_global_by_event_name."
    }

    fn scrape<'a>(
        &'a self,
        executor: &'a dyn QueryExecutor,
        sink: &'a mpsc::Sender<Sample>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), ScrapeError>> {
        Box::pin(async move {
            let mut rows = executor.fetch(MEMORY_EVENTS_QUERY, cancel.clone()).await?;

            while let Some(row) = rows.try_next().await? {
                let event_name = row.text(0, COL_EVENT_NAME)?.to_string();
                let alloc = row.numeric(1, COL_BYTES_ALLOC)?;
                let free = row.numeric(2, COL_BYTES_FREE)?;
                let used = row.numeric(3, COL_BYTES_USED)?;
                trace!(%event_name, alloc, free, used, "decoded memory event row");

                send(
                    sink,
                    Sample::counter(ALLOC_BYTES_NAME, ALLOC_BYTES_HELP, alloc, label(&event_name)),
                )
                .await?;
                send(
                    sink,
                    Sample::counter(FREE_BYTES_NAME, FREE_BYTES_HELP, free, label(&event_name)),
                )
                .await?;
                send(
                    sink,
                    Sample::gauge(USED_BYTES_NAME, USED_BYTES_HELP, used, label(&event_name)),
                )
                .await?;
            }

            Ok(())
        })
    }
}

fn label(event_name: &str) -> Vec<(&'static str, String)> {
    vec![("event_name", event_name.to_string())]
}
