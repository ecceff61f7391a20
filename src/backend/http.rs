//! HTTP implementation of [`LogBackend`] for the Graylog REST API.

use crate::backend::model::{parse_messages, parse_streams, Stream};
use crate::backend::LogBackend;
use crate::error::{GraytailError, Result};
use crate::query::SearchRequest;
use crate::store::MessageRecord;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Client, Request, RequestBuilder, Url};
use std::time::Duration;

/// Basic-auth HTTP client for one server.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl HttpBackend {
    /// Build a client for `base_url` (e.g. `https://graylog.example.com/api`).
    ///
    /// Fails when `base_url` is not an absolute http(s) URL or the underlying HTTP
    /// client cannot be constructed.
    pub fn new(
        base_url: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url.as_ref())?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraytailError::config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            username: username.into(),
            password: password.into(),
        })
    }

    /// The API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url(), path))
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
    }

    /// The request `list_streams` sends.
    pub fn streams_request(&self) -> Result<Request> {
        self.get("/streams").build().map_err(request_error)
    }

    /// The request `search` sends for `request`.
    pub fn search_request(&self, request: &SearchRequest) -> Result<Request> {
        self.get("/search/universal/absolute")
            .query(&[
                ("query", request.query_string.clone()),
                ("filter", request.stream_filter()),
                ("fields", request.fields.clone()),
                ("limit", request.limit.to_string()),
                ("sort", request.sort.to_string()),
                ("from", wire_timestamp(request.window.from)),
                ("to", wire_timestamp(request.window.to)),
            ])
            .build()
            .map_err(request_error)
    }

    /// Send a request and return the body of a 2xx response.
    async fn fetch(&self, request: Request) -> Result<String> {
        debug!("GET {}", request.url());
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GraytailError::from_status(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl LogBackend for HttpBackend {
    async fn list_streams(&self) -> Result<Vec<Stream>> {
        let body = self.fetch(self.streams_request()?).await?;
        parse_streams(&body)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<MessageRecord>> {
        let body = self.fetch(self.search_request(request)?).await?;
        parse_messages(&body)
    }
}

/// UTC RFC3339 with nanosecond precision, e.g. `2024-01-01T00:00:00.000000000Z`.
pub fn wire_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| GraytailError::config(format!("invalid baseurl `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(GraytailError::config(format!(
            "invalid baseurl `{raw}`: unsupported scheme `{scheme}`"
        ))),
    }
}

fn request_error(err: reqwest::Error) -> GraytailError {
    GraytailError::config(format!("invalid request: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Stream;
    use crate::query::{compose, Sort, TimeWindow};
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn backend() -> HttpBackend {
        HttpBackend::new(
            "http://graylog.local:9000/api/",
            "admin",
            "secret",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(backend().base_url(), "http://graylog.local:9000/api");
    }

    #[test]
    fn malformed_base_url_is_config_error() {
        for raw in ["not a url", "graylog.local:9000/api", "ftp://graylog.local/api", ""] {
            let err = HttpBackend::new(raw, "admin", "secret", Duration::from_secs(5))
                .err()
                .unwrap_or_else(|| panic!("`{raw}` should be rejected"));
            assert!(matches!(err, GraytailError::Config { .. }), "{raw}: {err:?}");
        }
    }

    #[test]
    fn bare_host_base_url_is_accepted() {
        let backend =
            HttpBackend::new("https://graylog.local", "admin", "secret", Duration::from_secs(5))
                .unwrap();
        assert_eq!(backend.base_url(), "https://graylog.local");
        assert_eq!(
            backend.streams_request().unwrap().url().as_str(),
            "https://graylog.local/streams"
        );
    }

    #[test]
    fn streams_request_carries_auth_and_accept() {
        let request = backend().streams_request().unwrap();
        assert_eq!(request.url().as_str(), "http://graylog.local:9000/api/streams");
        assert_eq!(request.headers()[ACCEPT], "application/json");
        let auth = request.headers()[reqwest::header::AUTHORIZATION]
            .to_str()
            .unwrap();
        assert!(auth.starts_with("Basic "));
    }

    #[test]
    fn search_request_encodes_parameters() {
        let stream = Stream {
            id: "abc123".into(),
            name: "nginx".into(),
        };
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap();
        let search = compose(
            "source:web AND level:3",
            Some(&stream),
            TimeWindow::new(from, to),
            Sort::default(),
            100,
        )
        .unwrap();

        let request = backend().search_request(&search).unwrap();
        assert_eq!(request.url().path(), "/api/search/universal/absolute");

        let params: HashMap<String, String> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(params["query"], "source:web AND level:3");
        assert_eq!(params["filter"], "streams:abc123");
        assert_eq!(params["fields"], "*");
        assert_eq!(params["limit"], "100");
        assert_eq!(params["sort"], "timestamp:asc");
        assert_eq!(params["from"], "2024-01-01T00:00:00.000000000Z");
        assert_eq!(params["to"], "2024-01-01T00:05:00.000000000Z");
    }

    #[test]
    fn wire_timestamp_keeps_nanoseconds() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(wire_timestamp(ts), "2023-11-14T22:13:20.123456789Z");
    }
}
