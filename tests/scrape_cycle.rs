//! Full collection cycles through the public API: scrapers running on
//! their own tasks, one shared bounded sink, failures reported per
//! scraper.

use futures::{
    future::BoxFuture,
    StreamExt,
};
use mysqld_exporter::{
    error::ScrapeError,
    executor::{
        QueryExecutor,
        RowStream,
        TextRow,
    },
    exporter::Exporter,
    metrics::{
        render_text,
        MetricKind,
        Sample,
    },
    scrapers::{
        self,
        Scraper,
    },
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Replays the same canned rows for every fetch.
struct ReplayExecutor {
    rows: Vec<TextRow>,
    fail_with: Option<&'static str>,
}

impl ReplayExecutor {
    fn with_rows(rows: Vec<TextRow>) -> Self {
        Self {
            rows,
            fail_with: None,
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            rows: Vec::new(),
            fail_with: Some(message),
        }
    }
}

impl QueryExecutor for ReplayExecutor {
    fn fetch<'a>(
        &'a self,
        _sql: &'a str,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<RowStream<'a>, ScrapeError>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }
            if let Some(message) = self.fail_with {
                return Err(ScrapeError::Query(message.into()));
            }
            let rows = self.rows.clone();
            Ok(futures::stream::iter(rows.into_iter().map(Ok)).boxed())
        })
    }
}

fn fixture_rows() -> Vec<TextRow> {
    vec![
        TextRow::from_cells(["memory/innodb/event1", "1001", "500", "501"]),
        TextRow::from_cells(["memory/innodb/event2", "2002", "1000", "1002"]),
        TextRow::from_cells(["memory/sql/event1", "30", "4", "26"]),
    ]
}

#[tokio::test]
async fn one_cycle_delivers_the_full_ordered_batch() {
    let exporter = Exporter::new(scrapers::default_set());
    let executor = Arc::new(ReplayExecutor::with_rows(fixture_rows()));

    let report = exporter
        .collect_once(executor, CancellationToken::new())
        .await;

    assert!(report.failures.is_empty());
    assert_eq!(report.samples.len(), 9);

    let expected: Vec<(&str, MetricKind, f64)> = vec![
        ("memory/innodb/event1", MetricKind::Counter, 1001.0),
        ("memory/innodb/event1", MetricKind::Counter, 500.0),
        ("memory/innodb/event1", MetricKind::Gauge, 501.0),
        ("memory/innodb/event2", MetricKind::Counter, 2002.0),
        ("memory/innodb/event2", MetricKind::Counter, 1000.0),
        ("memory/innodb/event2", MetricKind::Gauge, 1002.0),
        ("memory/sql/event1", MetricKind::Counter, 30.0),
        ("memory/sql/event1", MetricKind::Counter, 4.0),
        ("memory/sql/event1", MetricKind::Gauge, 26.0),
    ];
    let got: Vec<(&str, MetricKind, f64)> = report
        .samples
        .iter()
        .map(|sample| {
            let (_, event_name) = sample
                .labels
                .iter()
                .find(|(key, _)| *key == "event_name")
                .expect("event_name label");
            (event_name.as_str(), sample.kind, sample.value)
        })
        .collect();
    assert_eq!(got, expected);

    let text = render_text(&report.samples);
    assert!(text.contains(
        "mysql_perf_schema_memory_events_used_bytes{event_name=\"memory/sql/event1\"} 26"
    ));
    assert!(text.contains("# TYPE mysql_perf_schema_memory_events_alloc_bytes_total counter"));
}

#[tokio::test]
async fn query_failure_yields_a_structural_failure_and_no_samples() {
    let exporter = Exporter::new(scrapers::default_set());
    let executor = Arc::new(ReplayExecutor::failing("permission denied"));

    let report = exporter
        .collect_once(executor, CancellationToken::new())
        .await;

    assert!(report.samples.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].scraper, "perf_schema.memory_events");
    assert_eq!(report.structural_failures().count(), 1);
}

#[tokio::test]
async fn cancelled_cycle_is_not_a_structural_failure() {
    let exporter = Exporter::new(scrapers::default_set());
    let executor = Arc::new(ReplayExecutor::with_rows(fixture_rows()));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = exporter.collect_once(executor, cancel).await;

    assert!(report.samples.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_cancelled());
    assert_eq!(report.structural_failures().count(), 0);
}

/// A test-local scraper sharing the sink with the real one.
struct HeartbeatScraper;

impl Scraper for HeartbeatScraper {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    fn help(&self) -> &'static str {
        "Emits fixed gauges; exists to share the sink with a real scraper."
    }

    fn scrape<'a>(
        &'a self,
        _executor: &'a dyn QueryExecutor,
        sink: &'a mpsc::Sender<Sample>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<(), ScrapeError>> {
        Box::pin(async move {
            for beat in 1..=2 {
                let sample = Sample::gauge(
                    "heartbeat_beats",
                    "Fixed heartbeat gauge.",
                    f64::from(beat),
                    vec![("event_name", format!("heartbeat/{beat}"))],
                );
                sink.send(sample)
                    .await
                    .map_err(|_| ScrapeError::SinkClosed)?;
            }
            Ok(())
        })
    }
}

#[tokio::test]
async fn concurrent_scrapers_interleave_without_reordering_each_other() {
    let exporter = Exporter::new(vec![
        Arc::new(scrapers::MemoryEventsScraper) as Arc<dyn Scraper>,
        Arc::new(HeartbeatScraper),
    ])
    .with_sink_capacity(2);
    let executor = Arc::new(ReplayExecutor::with_rows(fixture_rows()));

    let report = exporter
        .collect_once(executor, CancellationToken::new())
        .await;

    assert!(report.failures.is_empty());
    assert_eq!(report.samples.len(), 11);

    // Per-scraper emission order survives interleaving.
    let memory_values: Vec<f64> = report
        .samples
        .iter()
        .filter(|sample| sample.name.starts_with("mysql_perf_schema_"))
        .map(|sample| sample.value)
        .collect();
    assert_eq!(
        memory_values,
        vec![1001.0, 500.0, 501.0, 2002.0, 1000.0, 1002.0, 30.0, 4.0, 26.0]
    );

    let heartbeat_values: Vec<f64> = report
        .samples
        .iter()
        .filter(|sample| sample.name == "heartbeat_beats")
        .map(|sample| sample.value)
        .collect();
    assert_eq!(heartbeat_values, vec![1.0, 2.0]);
}
