//! # mysqld-exporter
//!
//! A one-shot Prometheus scraper for MySQL `performance_schema`
//! statistics: it runs each enabled scraper's fixed SELECT against an
//! already-open connection pool, converts every result row into typed,
//! labeled samples, and streams them to a shared sink.
//!
//! ## Architecture
//!
//! - **`executor`**: the query boundary. "Execute a parameterless
//!   SELECT bound to a cancellation token, return a forward-only row
//!   cursor." Implemented for `sqlx::MySqlPool`; mocked in tests.
//! - **`scrapers`**: the `Scraper` trait plus the units implementing
//!   it. Each scraper owns one fixed query and a fixed per-row sample
//!   shape.
//! - **`metrics`**: the immutable `Sample` model and the text
//!   exposition renderer.
//! - **`exporter`**: the one-shot harness running scrapers
//!   concurrently against one shared bounded sink.
//! - **`config`**: settings and pool construction.
//!
//! Scrapers never retry, never schedule, and never persist; each
//! invocation is an independent translation of one result set into one
//! ordered sample batch.

pub mod config;
pub mod error;
pub mod executor;
pub mod exporter;
pub mod metrics;
pub mod scrapers;

pub use config::Settings;
pub use error::ScrapeError;
pub use executor::{
    QueryExecutor,
    RowStream,
    TextRow,
};
pub use exporter::{
    Exporter,
    ScrapeReport,
};
pub use metrics::{
    MetricKind,
    Sample,
};
pub use scrapers::Scraper;
