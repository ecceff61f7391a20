use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use tokio_test::assert_ok;

use graytail::query::{compose, Sort};
use graytail::{GraytailError, HttpBackend, LogBackend, SearchRequest, Stream, TimeWindow};

/// What the server saw for one request.
struct Seen {
    path: String,
    params: HashMap<String, String>,
    authorization: Option<String>,
    accept: Option<String>,
}

struct TestServer {
    base_url: String,
    seen: mpsc::Receiver<Seen>,
    handle: thread::JoinHandle<()>,
}

impl TestServer {
    /// Serve one canned `(status, body)` reply per incoming request, in order.
    fn start(replies: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind test server");
        let port = server
            .server_addr()
            .to_ip()
            .expect("tcp listener")
            .port();
        let (tx, seen) = mpsc::channel();

        let handle = thread::spawn(move || {
            for (status, body) in replies {
                let request = match server.recv_timeout(Duration::from_secs(5)) {
                    Ok(Some(request)) => request,
                    _ => return,
                };

                let url = reqwest::Url::parse(&format!("http://localhost{}", request.url()))
                    .expect("request url");
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };
                let _ = tx.send(Seen {
                    path: url.path().to_string(),
                    params: url.query_pairs().into_owned().collect(),
                    authorization: header("Authorization"),
                    accept: header("Accept"),
                });

                let mut response = Response::from_string(body).with_status_code(status);
                response.add_header(
                    Header::from_bytes(b"Content-Type".as_slice(), b"application/json".as_slice())
                        .unwrap(),
                );
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}/api/"),
            seen,
            handle,
        }
    }

    fn backend(&self) -> HttpBackend {
        HttpBackend::new(&self.base_url, "admin", "secret", Duration::from_secs(5))
            .expect("build backend")
    }

    fn next_seen(&self) -> Seen {
        self.seen
            .recv_timeout(Duration::from_secs(5))
            .expect("server saw no request")
    }

    fn join(self) {
        self.handle.join().expect("server thread panicked");
    }
}

fn stream() -> Stream {
    Stream {
        id: "5f1e2d3c".to_string(),
        name: "nginx".to_string(),
    }
}

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn request(query: &str) -> SearchRequest {
    let window = TimeWindow::new(
        at("2024-03-01T10:00:00.001Z"),
        at("2024-03-01T10:00:05.250Z"),
    );
    compose(query, Some(&stream()), window, Sort::default(), 100).unwrap()
}

const MESSAGES: &str = r#"{
    "messages": [
        {"message": {"timestamp": "2024-03-01T10:00:01.000Z", "source": "web-1", "message": "GET / 200", "http_status": 200}},
        {"message": {"timestamp": "2024-03-01T10:00:02.000Z", "source": "web-2", "message": "GET /login 502"}}
    ],
    "total_results": 2
}"#;

#[tokio::test]
async fn search_sends_wire_parameters_and_decodes_messages() {
    let server = TestServer::start(vec![(200, MESSAGES)]);
    let backend = server.backend();

    let records = assert_ok!(backend.search(&request("level:3")).await);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display(), "2024-03-01T10:00:01.000Z web-1 GET / 200");
    assert_eq!(records[1].source(), "web-2");

    let seen = server.next_seen();
    assert_eq!(seen.path, "/api/search/universal/absolute");
    assert_eq!(seen.params["query"], "level:3");
    assert_eq!(seen.params["filter"], "streams:5f1e2d3c");
    assert_eq!(seen.params["fields"], "*");
    assert_eq!(seen.params["limit"], "100");
    assert_eq!(seen.params["sort"], "timestamp:asc");
    assert_eq!(seen.params["from"], "2024-03-01T10:00:00.001000000Z");
    assert_eq!(seen.params["to"], "2024-03-01T10:00:05.250000000Z");
    assert_eq!(seen.authorization.as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(seen.accept.as_deref(), Some("application/json"));

    server.join();
}

#[tokio::test]
async fn list_streams_uses_titles() {
    let body = r#"{"total": 2, "streams": [
        {"id": "000000000000000000000001", "title": "All messages"},
        {"id": "5f1e2d3c", "title": "nginx", "description": "edge proxies"}
    ]}"#;
    let server = TestServer::start(vec![(200, body)]);

    let streams = assert_ok!(server.backend().list_streams().await);
    assert_eq!(
        streams.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["All messages", "nginx"]
    );
    assert_eq!(streams[1], stream());

    assert_eq!(server.next_seen().path, "/api/streams");
    server.join();
}

#[tokio::test]
async fn unauthorized_surfaces_body_verbatim() {
    let body = r#"{"type":"ApiError","message":"Not authorized"}"#;
    let server = TestServer::start(vec![(401, body)]);

    let err = server.backend().search(&request("")).await.unwrap_err();
    match &err {
        GraytailError::Auth { status, body: got } => {
            assert_eq!(*status, 401);
            assert_eq!(got, body);
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    assert!(err.is_auth());

    assert_eq!(server.next_seen().params["query"], "*");
    server.join();
}

#[tokio::test]
async fn server_error_is_backend_error() {
    let server = TestServer::start(vec![(500, "index unavailable")]);

    let err = server.backend().list_streams().await.unwrap_err();
    assert!(matches!(
        err,
        GraytailError::Backend { status: 500, ref body } if body == "index unavailable"
    ));
    server.join();
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = TestServer::start(vec![
        (200, r#"{"messages": [{"message": "#),
        (200, r#"{"messages": [{"message": "not an object"}]}"#),
    ]);
    let backend = server.backend();

    let err = backend.search(&request("")).await.unwrap_err();
    assert!(matches!(err, GraytailError::Decode { .. }), "{err:?}");

    let err = backend.search(&request("")).await.unwrap_err();
    assert!(matches!(err, GraytailError::Decode { .. }), "{err:?}");

    server.join();
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend = HttpBackend::new(
        format!("http://127.0.0.1:{port}/api"),
        "admin",
        "secret",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = backend.list_streams().await.unwrap_err();
    assert!(matches!(err, GraytailError::Transport { .. }), "{err:?}");
    assert!(!err.is_auth());
}
