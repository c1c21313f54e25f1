use std::fmt::Display;

/// Failure of a single scrape invocation.
///
/// The three structural kinds mirror the stages of a scrape: the
/// statement could not run at all (`Query`), a delivered row could not
/// be interpreted (`Decode`), or the surrounding cycle was torn down
/// (`Cancelled` / `SinkClosed`). Callers that only care about the
/// teardown distinction use [`ScrapeError::is_cancelled`].
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("query execution failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("row decode failed for column {column}: {message}")]
    Decode { column: String, message: String },

    #[error("scrape cancelled")]
    Cancelled,

    #[error("sample sink closed before the scrape finished")]
    SinkClosed,
}

impl ScrapeError {
    pub fn query(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ScrapeError::Query(Box::new(source))
    }

    pub fn decode(column: impl Into<String>, message: impl Display) -> Self {
        ScrapeError::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }

    /// Whether this failure is part of a routine teardown rather than a
    /// structural problem with the source. Cancellation and a hung-up
    /// sink both mean the cycle is ending; the harness logs them below
    /// error severity.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScrapeError::Cancelled | ScrapeError::SinkClosed)
    }
}
