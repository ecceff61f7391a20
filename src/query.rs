//! Search request composition.
//!
//! Turns the user's query text, the selected stream and a time window into an
//! immutable [`SearchRequest`]. Composition is pure: it never touches the network and
//! rejects requests that have no stream to search.

use crate::backend::Stream;
use crate::error::{GraytailError, Result};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Default number of messages requested per search.
pub const DEFAULT_LIMIT: u32 = 100;

/// Field selector sent with every search; narrowing happens at display time.
pub const ALL_FIELDS: &str = "*";

/// Query string sent when the user has not typed anything.
pub const MATCH_ALL: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort specification, rendered on the wire as `field:order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: "timestamp".to_string(),
            order: SortOrder::Asc,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.order.as_str())
    }
}

/// Absolute search window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Window for the next tail poll.
    ///
    /// Starts just after the newest timestamp already seen (the backend resolves
    /// timestamps to the millisecond, so +1ms excludes it) or `lookback` before `now`
    /// when nothing has been seen yet. The end is `now`, clamped so it never precedes
    /// the start. A lookback reaching past the earliest representable instant starts
    /// there instead.
    pub fn tail(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>, lookback: Duration) -> Self {
        let from = match last_seen {
            Some(ts) => ts
                .checked_add_signed(Duration::milliseconds(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            None => lookback_start(now, lookback),
        };
        Self {
            from,
            to: now.max(from),
        }
    }

    /// The `range` leading up to `now`, for one-shot searches.
    pub fn relative(now: DateTime<Utc>, range: Duration) -> Self {
        Self {
            from: lookback_start(now, range),
            to: now,
        }
    }
}

fn lookback_start(now: DateTime<Utc>, lookback: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(lookback)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A fully composed search. Built fresh for every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query_string: String,
    pub stream_id: String,
    pub fields: String,
    pub limit: u32,
    pub sort: Sort,
    pub window: TimeWindow,
}

impl SearchRequest {
    /// The `filter` parameter value restricting the search to one stream.
    pub fn stream_filter(&self) -> String {
        format!("streams:{}", self.stream_id)
    }
}

/// Compose a search request from the current UI state.
///
/// Fails with [`GraytailError::Validation`] when no stream is selected.
pub fn compose(
    query: &str,
    stream: Option<&Stream>,
    window: TimeWindow,
    sort: Sort,
    limit: u32,
) -> Result<SearchRequest> {
    let stream = stream.ok_or_else(|| GraytailError::validation("First select stream"))?;

    let query = query.trim();
    let query_string = if query.is_empty() {
        MATCH_ALL.to_string()
    } else {
        query.to_string()
    };

    Ok(SearchRequest {
        query_string,
        stream_id: stream.id.clone(),
        fields: ALL_FIELDS.to_string(),
        limit,
        sort,
        window,
    })
}

/// Combine a new filter term with an existing query using `AND`.
///
/// Prior terms are never replaced; a blank term leaves the query as it was.
pub fn and_filter(existing: &str, term: &str) -> String {
    let existing = existing.trim();
    let term = term.trim();
    match (existing.is_empty(), term.is_empty()) {
        (_, true) => existing.to_string(),
        (true, false) => term.to_string(),
        (false, false) => format!("{existing} AND {term}"),
    }
}

/// Build a `field:"value"` term, escaping quotes and backslashes in the value.
pub fn field_filter(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{field}:\"{escaped}\"")
}
