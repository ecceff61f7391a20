//! Normalized message records and their fingerprints.
//!
//! A record's identity is the hash of its canonical display string, not of its
//! structured fields. The display line a renderer shows is therefore also the key used
//! to fetch the full record back.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// Deterministic hash of a canonical display string (hex-encoded BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a rendered line. The line is normalized first, so text read back
    /// from a terminal pane (trailing padding, wrapped whitespace) hashes the same as
    /// the string the store produced.
    pub fn of_line(line: &str) -> Self {
        Self::of_canonical(&normalize_whitespace(line))
    }

    fn of_canonical(canonical: &str) -> Self {
        Self(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One log message as returned by the backend, plus the derived display data.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    raw_fields: Map<String, Value>,
    timestamp: Option<DateTime<Utc>>,
    source: String,
    message: String,
    display: String,
    fingerprint: Fingerprint,
}

impl MessageRecord {
    /// Build a record from the backend's field map.
    ///
    /// `timestamp`, `source` and `message` are read from the map; missing attributes
    /// render as empty strings. The timestamp is only parsed when it is RFC3339.
    pub fn from_fields(raw_fields: Map<String, Value>) -> Self {
        let timestamp_text = display_value(raw_fields.get("timestamp"));
        let source = display_value(raw_fields.get("source"));
        let message = display_value(raw_fields.get("message"));

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc));

        let display = normalize_whitespace(&format!("{timestamp_text} {source} {message}"));
        let fingerprint = Fingerprint::of_canonical(&display);

        Self {
            raw_fields,
            timestamp,
            source,
            message,
            display,
            fingerprint,
        }
    }

    pub fn raw_fields(&self) -> &Map<String, Value> {
        &self.raw_fields
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Canonical display string: `"<timestamp> <source> <message>"`, whitespace-normalized.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// `(field, value)` pairs for the drill-down view, sorted by field name.
    pub fn detail_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .raw_fields
            .iter()
            .map(|(key, value)| (key.clone(), display_value(Some(value))))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Render a JSON attribute for display. Strings are shown bare, everything else in
/// its JSON form, missing or null values as empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Collapse every whitespace run (including newlines) to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
