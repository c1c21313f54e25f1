//! # Metrics Module
//!
//! The sample model shared by all scrapers and the text-exposition
//! renderer used by the one-shot CLI.
//!
//! A [`Sample`] is one emitted observation: a metric name, a kind
//! (counter or gauge), a numeric value, and its label set. Samples are
//! immutable once constructed; after a scraper sends one to the sink it
//! keeps no reference to it.

pub mod render;

pub use render::render_text;

/// How a metric's value behaves over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Monotonically non-decreasing.
    Counter,
    /// Instantaneous, freely fluctuating.
    Gauge,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One emitted metric observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub value: f64,
    /// Label pairs, e.g. `("event_name", "memory/innodb/event1")`.
    pub labels: Vec<(&'static str, String)>,
}

impl Sample {
    pub fn counter(
        name: &'static str,
        help: &'static str,
        value: f64,
        labels: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            value,
            labels,
        }
    }

    pub fn gauge(
        name: &'static str,
        help: &'static str,
        value: f64,
        labels: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            value,
            labels,
        }
    }
}
