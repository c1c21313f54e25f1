//! # Query Executor Module
//!
//! The boundary between scrapers and the database driver: "execute a
//! parameterless SELECT bound to a cancellation token, return a
//! forward-only row cursor".
//!
//! Rows cross the boundary as [`TextRow`]s, ordered textual cells, since
//! the source may represent integers as decimal strings. Typing the
//! cells is the scraper's job; the executor only preserves the wire
//! representation.
//!
//! The production implementation lives on [`sqlx::MySqlPool`]. It
//! streams rows (`fetch`, never `fetch_all`) so that output can be
//! emitted incrementally, and folds the cancellation token into every
//! cursor advance so a cancelled scrape aborts the underlying I/O
//! promptly instead of being polled by the row loop.

use crate::error::ScrapeError;
use futures::{
    future::BoxFuture,
    stream::BoxStream,
    StreamExt,
    TryStreamExt,
};
use sqlx::{
    mysql::MySqlRow,
    Column,
    MySqlPool,
    Row,
    TypeInfo,
    ValueRef,
};
use tokio_util::sync::CancellationToken;

/// Forward-only cursor over a query's result rows. Consumed once; a
/// deferred cursor-level error may surface as the final item.
pub type RowStream<'a> = BoxStream<'a, Result<TextRow, ScrapeError>>;

/// Executes one parameterless SELECT and hands back a row cursor.
///
/// Implementations bind the cancellation token themselves; callers never
/// poll it inside their row loops. The executor owns connection
/// lifecycle concerns; scrapers never open or close anything.
pub trait QueryExecutor: Send + Sync {
    fn fetch<'a>(
        &'a self,
        sql: &'a str,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<RowStream<'a>, ScrapeError>>;
}

/// One result row as ordered, NULL-able textual cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow(Vec<Option<String>>);

impl TextRow {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self(cells)
    }

    /// Build a row from non-NULL cells. Test and fixture convenience.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(cells.into_iter().map(|cell| Some(cell.into())).collect())
    }

    /// The cell at `idx` as text. `column` names the expected column in
    /// decode failures.
    pub fn text(&self, idx: usize, column: &str) -> Result<&str, ScrapeError> {
        match self.0.get(idx) {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(ScrapeError::decode(column, "unexpected NULL")),
            None => Err(ScrapeError::decode(
                column,
                format!("row has only {} columns", self.0.len()),
            )),
        }
    }

    /// The cell at `idx` parsed as a number. Accepts integer- or
    /// float-formatted decimal text; malformed text is a decode failure,
    /// never a silent zero.
    pub fn numeric(&self, idx: usize, column: &str) -> Result<f64, ScrapeError> {
        let raw = self.text(idx, column)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| ScrapeError::decode(column, format!("malformed numeric value {raw:?}")))
    }
}

impl QueryExecutor for MySqlPool {
    fn fetch<'a>(
        &'a self,
        sql: &'a str,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<RowStream<'a>, ScrapeError>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(ScrapeError::Cancelled);
            }

            let rows = sqlx::query(sql).fetch(self);
            let stream = futures::stream::try_unfold((rows, cancel), |(mut rows, cancel)| async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(ScrapeError::Cancelled),
                    next = rows.try_next() => match next {
                        Ok(Some(row)) => {
                            let text = row_to_text(&row)?;
                            Ok(Some((text, (rows, cancel))))
                        }
                        Ok(None) => Ok(None),
                        Err(err) => Err(ScrapeError::query(err)),
                    },
                }
            });

            Ok(stream.boxed())
        })
    }
}

fn row_to_text(row: &MySqlRow) -> Result<TextRow, ScrapeError> {
    let mut cells = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        cells.push(cell_to_text(row, idx, column.name())?);
    }
    Ok(TextRow::new(cells))
}

/// MySQL hands back strings over the text protocol and native integers
/// over the binary protocol; both are reduced to their decimal text
/// form here.
fn cell_to_text(row: &MySqlRow, idx: usize, column: &str) -> Result<Option<String>, ScrapeError> {
    let raw = row.try_get_raw(idx).map_err(ScrapeError::query)?;
    if raw.is_null() {
        return Ok(None);
    }
    let type_name = raw.type_info().name().to_string();

    if let Ok(text) = row.try_get::<String, _>(idx) {
        return Ok(Some(text));
    }
    if let Ok(int) = row.try_get::<i64, _>(idx) {
        return Ok(Some(int.to_string()));
    }
    if let Ok(uint) = row.try_get::<u64, _>(idx) {
        return Ok(Some(uint.to_string()));
    }
    if let Ok(float) = row.try_get::<f64, _>(idx) {
        return Ok(Some(float.to_string()));
    }

    Err(ScrapeError::decode(
        column,
        format!("unsupported column type {type_name}"),
    ))
}
