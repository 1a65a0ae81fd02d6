#![cfg(feature = "ureq")]

//! Fetches against the live mock server over real HTTP.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Fetch` through
//! `UreqTransport`. Completions arrive on ureq worker threads and are handed
//! back to the test thread over a channel.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Write};
use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use fetch_core::{Fetch, FetchError, FetchOutcome, HttpMethod, Transport, UreqTransport};
use mock_server::{Echo, MockCreated};

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Answer exactly one connection with `response` and hand back the request
/// head as received.
fn serve_once(response: Vec<u8>) -> (SocketAddr, mpsc::Receiver<String>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        let mut stream = reader.into_inner();
        stream.write_all(&response).unwrap();
        stream.flush().unwrap();
        tx.send(head).unwrap();
    });

    (addr, rx)
}

fn local(transport: &Arc<dyn Transport>, addr: SocketAddr) -> Fetch {
    Fetch::with_tls(transport.clone(), addr.ip().to_string(), false).set_port(addr.port())
}

/// Dispatch and block until the completion fires.
fn send(fetch: Fetch, method: HttpMethod) -> FetchOutcome {
    let (tx, rx) = mpsc::channel();
    fetch.dispatch(method, move |outcome| tx.send(outcome).unwrap());
    let outcome = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("completion never fired");
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err(), "completion fired twice");
    outcome
}

#[test_log::test]
fn hello_world_roundtrip() {
    let addr = start_server();
    let transport: Arc<dyn Transport> =
        Arc::new(UreqTransport::with_timeout(Duration::from_secs(5)));

    // Step 1: register a mock through the builder itself.
    let created = send(
        local(&transport, addr)
            .set_path("/mocks")
            .add_header("content-type", "application/json")
            .set_body(r#"{"body":"{\"hello\": \"world\"}"}"#),
        HttpMethod::Post,
    );
    assert_eq!(created.response().unwrap().status, 201);
    let MockCreated { id } = serde_json::from_slice(&created.into_result().unwrap()).unwrap();

    // Step 2: fetch it back.
    let outcome = send(
        local(&transport, addr)
            .use_form_url_encoding()
            .set_path(format!("/v2/{id}")),
        HttpMethod::Get,
    );
    let response = outcome.response().cloned().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("content-type"), Some("application/json"));
    let payload = outcome.into_result().unwrap();
    assert_eq!(std::str::from_utf8(&payload).unwrap(), r#"{"hello": "world"}"#);
}

#[test_log::test]
fn wire_request_matches_builder() {
    let addr = start_server();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = send(
        local(&transport, addr)
            .set_path("/echo")
            .add_param("q", "rust lang")
            .add_param("page", "1")
            .add_param("page", "2")
            .add_header("x-trace-id", "abc")
            .set_body("a=1&b=2"),
        HttpMethod::Put,
    );
    let echo: Echo = serde_json::from_slice(&outcome.into_result().unwrap()).unwrap();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo");
    assert_eq!(echo.query.len(), 2);
    assert_eq!(echo.query["q"], "rust lang");
    assert_eq!(echo.query["page"], "2");
    assert_eq!(echo.headers["accept"], "application/json");
    assert_eq!(echo.headers["x-trace-id"], "abc");
    assert_eq!(echo.body, "a=1&b=2");
}

#[test]
fn get_stays_get_on_the_wire() {
    let addr = start_server();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = send(local(&transport, addr).set_path("/echo"), HttpMethod::Get);
    let echo: Echo = serde_json::from_slice(&outcome.into_result().unwrap()).unwrap();
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_empty());
}

#[test]
fn error_status_is_still_a_payload() {
    let addr = start_server();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = send(
        local(&transport, addr).set_path("/v2/00000000-0000-0000-0000-000000000000"),
        HttpMethod::Get,
    );
    assert!(outcome.is_ok());
    assert_eq!(outcome.response().unwrap().status, 404);
}

#[test_log::test]
fn refused_connection_is_a_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    match send(local(&transport, addr).set_path("/v2/abc"), HttpMethod::Get) {
        FetchOutcome::Err {
            error: FetchError::Transport(e),
            response,
        } => {
            assert!(e.downcast_ref::<ureq::Error>().is_some());
            assert!(response.is_none());
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[test]
fn invalid_host_never_reaches_the_network() {
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = send(
        Fetch::new(transport, "exa mple.com").set_path("/v2/abc"),
        HttpMethod::Get,
    );
    match outcome {
        FetchOutcome::Err {
            error: FetchError::InvalidUrl { url, .. },
            response: None,
        } => assert_eq!(url, "https://exa mple.com/v2/abc"),
        other => panic!("expected InvalidUrl, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_future_over_real_http() {
    let addr = start_server();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = local(&transport, addr)
        .set_path("/echo")
        .add_param("k", "v")
        .fetch(HttpMethod::Delete)
        .await;
    let echo: Echo = serde_json::from_slice(&outcome.into_result().unwrap()).unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.query["k"], "v");
}

#[test_log::test]
fn brotli_body_is_decoded() {
    // `{"hello":"world"}` as emitted by a brotli encoder.
    let mut body = vec![0x0b, 0x08, 0x80];
    body.extend_from_slice(br#"{"hello":"world"}"#);
    body.push(0x03);

    let mut response = format!(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-encoding: br\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(&body);

    let (addr, head) = serve_once(response);
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());

    let outcome = send(local(&transport, addr).set_path("/v2/abc"), HttpMethod::Get);
    let head = head.recv_timeout(Duration::from_secs(10)).unwrap().to_ascii_lowercase();
    assert!(head.contains("accept-encoding: gzip, deflate, br"), "request head: {head}");

    let payload = outcome.into_result().unwrap();
    assert_eq!(std::str::from_utf8(&payload).unwrap(), r#"{"hello":"world"}"#);
}

#[test_log::test]
fn concurrent_builders_share_one_transport() {
    const THREADS: usize = 8;
    let addr = start_server();
    let transport: Arc<dyn Transport> = Arc::new(UreqTransport::new());
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let transport = transport.clone();
            let tx = tx.clone();
            std::thread::spawn(move || {
                local(&transport, addr)
                    .set_path("/echo")
                    .add_param("i", i.to_string())
                    .dispatch(HttpMethod::Get, move |outcome| tx.send(outcome).unwrap());
            })
        })
        .collect();
    drop(tx);
    for handle in handles {
        handle.join().unwrap();
    }

    let mut seen = BTreeSet::new();
    for _ in 0..THREADS {
        let outcome = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("completion never fired");
        let echo: Echo = serde_json::from_slice(&outcome.into_result().unwrap()).unwrap();
        assert!(seen.insert(echo.query["i"].clone()), "duplicate completion");
    }
    // Every sender is dropped once its completion ran, so the channel closes.
    assert!(rx.recv_timeout(Duration::from_secs(10)).is_err(), "extra completion");

    let expected: BTreeSet<String> = (0..THREADS).map(|i| i.to_string()).collect();
    assert_eq!(seen, expected);
}
