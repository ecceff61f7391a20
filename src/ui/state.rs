//! UI state management structures
//!
//! The view state mirrors an [`EngineSnapshot`] plus the purely visual bits the engine
//! does not care about: focus, cursors, the console text and the detail popup.

use crate::backend::Stream;
use crate::error::StatusKind;
use crate::input::Focus;
use crate::poll::EngineSnapshot;
use crate::query::field_filter;
use crate::store::MessageRecord;

/// Drill-down view of a single message.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    /// `(field, value)` pairs, sorted by field
    pub entries: Vec<(String, String)>,
    pub cursor: usize,
}

impl DetailView {
    pub fn from_record(line: &str, record: Option<&MessageRecord>) -> Self {
        match record {
            Some(record) => Self {
                title: record
                    .timestamp()
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_else(|| "Message details".to_string()),
                entries: record.detail_entries(),
                cursor: 0,
            },
            None => Self {
                title: format!("No details for: {line}"),
                entries: Vec::new(),
                cursor: 0,
            },
        }
    }

    /// Rendered `field:"value"` lines; also the exact text applied as a filter.
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(field, value)| field_filter(field, value))
            .collect()
    }

    /// Filter term for the entry under the cursor.
    pub fn selected_filter(&self) -> Option<String> {
        self.entries
            .get(self.cursor)
            .map(|(field, value)| field_filter(field, value))
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug)]
pub struct ViewState {
    pub snapshot: EngineSnapshot,
    pub focus: Focus,
    pub console: String,
    pub stream_cursor: usize,
    pub log_cursor: usize,
    /// Keep the log cursor pinned to the newest line as messages arrive
    pub follow_logs: bool,
    pub detail: Option<DetailView>,
    pub viewport_width: u16,
    pub viewport_height: u16,
}

impl ViewState {
    pub fn new(viewport_width: u16, viewport_height: u16) -> Self {
        Self {
            snapshot: EngineSnapshot::default(),
            focus: Focus::Console,
            console: String::new(),
            stream_cursor: 0,
            log_cursor: 0,
            follow_logs: true,
            detail: None,
            viewport_width,
            viewport_height,
        }
    }

    /// Install a fresh engine snapshot and keep the cursors in range.
    pub fn apply_snapshot(&mut self, snapshot: EngineSnapshot) {
        self.snapshot = snapshot;
        self.stream_cursor = clamp(self.stream_cursor, self.snapshot.streams.len());
        self.log_cursor = if self.follow_logs {
            self.snapshot.lines.len().saturating_sub(1)
        } else {
            clamp(self.log_cursor, self.snapshot.lines.len())
        };
    }

    /// Move the cursor of the focused pane by `delta` lines.
    pub fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Streams => {
                self.stream_cursor =
                    offset(self.stream_cursor, delta, self.snapshot.streams.len());
            }
            Focus::Logs => {
                let len = self.snapshot.lines.len();
                self.log_cursor = offset(self.log_cursor, delta, len);
                // Reaching the bottom resumes following, like `tail -f`.
                self.follow_logs = self.log_cursor + 1 >= len;
            }
            Focus::Detail => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.cursor = offset(detail.cursor, delta, detail.entries.len());
                }
            }
            Focus::Console => {}
        }
    }

    pub fn selected_stream(&self) -> Option<Stream> {
        self.snapshot.streams.get(self.stream_cursor).cloned()
    }

    pub fn selected_line(&self) -> Option<&str> {
        self.snapshot.lines.get(self.log_cursor).map(String::as_str)
    }

    pub fn open_detail(&mut self, detail: DetailView) {
        self.detail = Some(detail);
        self.focus = Focus::Detail;
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.focus = Focus::Logs;
    }

    pub fn update_terminal_size(&mut self, width: u16, height: u16) -> bool {
        let changed = self.viewport_width != width || self.viewport_height != height;
        self.viewport_width = width;
        self.viewport_height = height;
        changed
    }

    /// `[stream: X] [tail: on] [polling] <status>`
    pub fn status_text(&self) -> String {
        let stream = self
            .snapshot
            .stream
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("");
        let mut text = format!(
            "[stream: {}] [tail: {}] [{}]",
            stream,
            if self.snapshot.tail_enabled { "on" } else { "off" },
            self.snapshot.phase.label()
        );
        if let Some(status) = &self.snapshot.status {
            text.push(' ');
            text.push_str(&status.text);
        }
        text
    }

    pub fn status_kind(&self) -> StatusKind {
        self.snapshot
            .status
            .as_ref()
            .map_or(StatusKind::Info, |status| status.kind)
    }
}

fn clamp(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

fn offset(cursor: usize, delta: isize, len: usize) -> usize {
    clamp(cursor.saturating_add_signed(delta), len)
}
