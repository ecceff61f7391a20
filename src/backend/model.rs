//! Wire envelopes returned by the server and their decoding.

use crate::error::{GraytailError, Result};
use crate::store::MessageRecord;
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A named log channel on the server. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct StreamsEnvelope {
    streams: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
struct MessagesEnvelope {
    messages: Vec<MessageEntry>,
}

#[derive(Deserialize)]
struct MessageEntry {
    message: Value,
}

/// Decode a `{"streams": [...]}` body.
///
/// Entries without a string `id` cannot be searched and are skipped. The display name
/// is the stream's `title`, then `name`, then its id.
pub fn parse_streams(body: &str) -> Result<Vec<Stream>> {
    let envelope: StreamsEnvelope = serde_json::from_str(body)?;

    let streams = envelope
        .streams
        .into_iter()
        .filter_map(|fields| {
            let Some(id) = fields.get("id").and_then(Value::as_str) else {
                warn!("skipping stream without id: {}", Value::Object(fields.clone()));
                return None;
            };
            let name = ["title", "name"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .unwrap_or(id);
            Some(Stream {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect();

    Ok(streams)
}

/// Decode a `{"messages": [{"message": {...}}, ...]}` body.
///
/// Any entry whose `message` is not an object fails the whole response.
pub fn parse_messages(body: &str) -> Result<Vec<MessageRecord>> {
    let envelope: MessagesEnvelope = serde_json::from_str(body)?;

    envelope
        .messages
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match entry.message {
            Value::Object(fields) => Ok(MessageRecord::from_fields(fields)),
            other => Err(GraytailError::decode(format!(
                "message {idx} is not an object: {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stream_list() {
        let body = r#"{
            "total": 2,
            "streams": [
                {"id": "s1", "title": "All messages", "disabled": false},
                {"id": "s2", "name": "nginx"}
            ]
        }"#;

        let streams = parse_streams(body).unwrap();
        assert_eq!(
            streams,
            vec![
                Stream {
                    id: "s1".into(),
                    name: "All messages".into()
                },
                Stream {
                    id: "s2".into(),
                    name: "nginx".into()
                },
            ]
        );
    }

    #[test]
    fn stream_without_id_is_skipped() {
        let body = r#"{"streams": [{"title": "broken"}, {"id": "s3"}]}"#;
        let streams = parse_streams(body).unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].name, "s3");
    }

    #[test]
    fn malformed_stream_body_is_decode_error() {
        let err = parse_streams("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, GraytailError::Decode { .. }));

        let err = parse_streams(r#"{"total": 0}"#).unwrap_err();
        assert!(matches!(err, GraytailError::Decode { .. }));
    }

    #[test]
    fn parses_messages_in_order() {
        let body = r#"{
            "messages": [
                {"message": {"timestamp": "2024-01-01T00:00:01.000Z", "source": "a", "message": "one"}, "index": "graylog_0"},
                {"message": {"timestamp": "2024-01-01T00:00:02.000Z", "source": "b", "message": "two"}, "index": "graylog_0"}
            ],
            "total_results": 2
        }"#;

        let records = parse_messages(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display(), "2024-01-01T00:00:01.000Z a one");
        assert_eq!(records[1].display(), "2024-01-01T00:00:02.000Z b two");
    }

    #[test]
    fn non_object_message_fails_whole_response() {
        let body = r#"{"messages": [
            {"message": {"message": "fine"}},
            {"message": "not an object"}
        ]}"#;
        let err = parse_messages(body).unwrap_err();
        assert!(matches!(err, GraytailError::Decode { .. }));
    }
}
