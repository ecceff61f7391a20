//! Shared engine state.
//!
//! Everything the poll scheduler and the foreground share lives in one [`EngineState`]
//! behind a single mutex. [`Engine`] is the cloneable handle both sides hold. The lock
//! only ever guards bookkeeping; network calls happen outside it.

use crate::backend::Stream;
use crate::error::{GraytailError, Result, StatusKind};
use crate::query::and_filter;
use crate::store::{MessageRecord, MessageStore};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Where the poll loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// Tailing disabled (and no search requested) or no stream selected
    #[default]
    Idle,
    /// Waiting for the next tick
    Armed,
    /// A search is in flight
    Polling,
}

impl PollPhase {
    pub fn label(self) -> &'static str {
        match self {
            PollPhase::Idle => "idle",
            PollPhase::Armed => "armed",
            PollPhase::Polling => "polling",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PollState {
    pub stream: Option<Stream>,
    pub query: String,
    pub tail_enabled: bool,
    /// Newest message timestamp seen for the current stream
    pub last_timestamp: Option<DateTime<Utc>>,
    pub in_flight: bool,
    /// A one-shot search is waiting for the next free slot
    pub search_requested: bool,
    /// Bumped on every stream change so late completions can tell they are stale
    pub epoch: u64,
}

impl PollState {
    pub fn phase(&self) -> PollPhase {
        if self.in_flight {
            PollPhase::Polling
        } else if self.stream.is_some() && (self.tail_enabled || self.search_requested) {
            PollPhase::Armed
        } else {
            PollPhase::Idle
        }
    }

    /// Switch streams. Timestamp tracking restarts; an in-flight search is left alone.
    pub fn select_stream(&mut self, stream: Stream) {
        if self.stream.as_ref().map(|s| &s.id) == Some(&stream.id) {
            self.stream = Some(stream);
            return;
        }
        self.stream = Some(stream);
        self.last_timestamp = None;
        self.epoch += 1;
    }

    /// Advance `last_timestamp` to `candidate` if it is newer. Never moves backwards.
    pub fn advance_timestamp(&mut self, candidate: Option<DateTime<Utc>>) {
        if let Some(ts) = candidate {
            if self.last_timestamp.map_or(true, |last| ts > last) {
                self.last_timestamp = Some(ts);
            }
        }
    }
}

/// Last event worth showing on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn from_error(err: &GraytailError) -> Self {
        Self {
            kind: err.status_kind(),
            text: err.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EngineState {
    pub poll: PollState,
    pub store: MessageStore,
    pub streams: Vec<Stream>,
    pub status: Option<Status>,
    pub polls_completed: u64,
}

/// Plain-data copy of the engine for the render surface.
#[derive(Debug, Clone, Default)]
pub struct EngineSnapshot {
    pub streams: Vec<Stream>,
    pub stream: Option<Stream>,
    pub query: String,
    pub tail_enabled: bool,
    pub phase: PollPhase,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub status: Option<Status>,
    pub fields: Vec<String>,
    pub lines: Vec<String>,
    pub polls_completed: u64,
}

/// Cloneable handle to the shared engine state.
#[derive(Clone, Default)]
pub struct Engine {
    inner: Arc<Mutex<EngineState>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state. Keep the guard short-lived and never hold it across an await.
    pub fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.inner.lock()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.lock();
        EngineSnapshot {
            streams: state.streams.clone(),
            stream: state.poll.stream.clone(),
            query: state.poll.query.clone(),
            tail_enabled: state.poll.tail_enabled,
            phase: state.poll.phase(),
            last_timestamp: state.poll.last_timestamp,
            status: state.status.clone(),
            fields: state.store.fields().to_vec(),
            lines: state.store.lines(),
            polls_completed: state.polls_completed,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.lock().poll.phase()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.lock().poll.last_timestamp
    }

    pub fn fields(&self) -> Vec<String> {
        self.lock().store.fields().to_vec()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().store.lines()
    }

    /// Full record behind a displayed line, for drill-down.
    pub fn lookup_line(&self, line: &str) -> Option<MessageRecord> {
        self.lock().store.lookup_line(line).cloned()
    }

    pub fn replace_streams(&self, streams: Vec<Stream>) {
        self.lock().streams = streams;
    }

    pub fn select_stream(&self, stream: Stream) {
        let mut state = self.lock();
        state.status = Some(Status::info(format!(
            "Selecting stream {} with id {}",
            stream.name, stream.id
        )));
        state.poll.select_stream(stream);
    }

    /// Select a stream from the loaded list by display name.
    pub fn select_stream_by_name(&self, name: &str) -> Result<Stream> {
        let stream = self
            .lock()
            .streams
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| GraytailError::validation(format!("Unknown stream: {name}")))?;
        self.select_stream(stream.clone());
        Ok(stream)
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.lock().poll.query = query.into();
    }

    /// AND a filter term onto the current query; returns the new query.
    pub fn append_filter(&self, term: &str) -> String {
        let mut state = self.lock();
        let query = and_filter(&state.poll.query, term);
        state.poll.query = query.clone();
        query
    }

    pub fn set_tail(&self, enabled: bool) {
        self.lock().poll.tail_enabled = enabled;
    }

    pub fn toggle_tail(&self) -> bool {
        let mut state = self.lock();
        state.poll.tail_enabled = !state.poll.tail_enabled;
        state.poll.tail_enabled
    }

    /// Drop retained messages; the field catalog is kept.
    pub fn clear_messages(&self) {
        self.lock().store.clear();
    }

    pub fn set_status(&self, status: Status) {
        self.lock().status = Some(status);
    }

    pub fn status(&self) -> Option<Status> {
        self.lock().status.clone()
    }
}
