//! End-to-end tests for `RouterClient` against a canned-response HTTP
//! fixture on a loopback socket. No mock-server crate: the fixture accepts
//! one connection per scripted response, drains the request, and writes the
//! canned bytes back.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use client::{ApiKey, RouterClient, RouterConfig};
use routing::{
    InvocationId, ModelId, ModelRouter, RetryPolicy, RoutingError, RoutingRequest, TokenCount,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn http_response(status: &str, extra_headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
        body.len()
    );
    for (name, value) in extra_headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(body);
    response
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Reads one HTTP request (headers plus `content-length` body bytes) so the
/// peer never sees a reset while still writing.
async fn drain_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() - (pos + 4) >= content_length {
                return;
            }
        }
    }
}

/// Serves the scripted responses, one connection each, and counts accepted
/// connections.
async fn serve(responses: Vec<String>) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            drain_request(&mut stream).await;
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });
    (addr, connections)
}

fn config_for(addr: SocketAddr) -> RouterConfig {
    RouterConfig {
        base_url: format!("http://{addr}"),
        api_key: Some(ApiKey::new("nd-test-key")),
        request_timeout: Duration::from_secs(5),
    }
}

fn request() -> RoutingRequest {
    RoutingRequest::new(
        "Say this is a test.",
        vec![
            ModelId::new("gpt-4o").unwrap(),
            ModelId::new("gpt-4o-mini").unwrap(),
        ],
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_call_selects_a_candidate_member() {
    let body = r#"{
        "selected_model": "gpt-4o-mini",
        "session_id": "sess-81c2",
        "usage": {"prompt_tokens": 12, "completion_tokens": 30}
    }"#;
    let (addr, _) = serve(vec![http_response("200 OK", &[], body)]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let request = request();
    let decision = client.route(InvocationId::new_random(), &request).await.unwrap();

    assert!(request.contains_candidate(&decision.selected));
    assert_eq!(decision.selected.as_str(), "gpt-4o-mini");
    assert_eq!(decision.session.unwrap().as_str(), "sess-81c2");
    assert_eq!(decision.usage.total_tokens, TokenCount::new(42));
}

#[tokio::test]
async fn selection_outside_candidates_is_invalid_response() {
    let body = r#"{"selected_model": "o3"}"#;
    let (addr, _) = serve(vec![http_response("200 OK", &[], body)]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidResponse { .. }));
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
}

#[tokio::test]
async fn missing_credentials_fail_without_network_traffic() {
    let (addr, connections) = serve(vec![http_response("200 OK", &[], "{}")]).await;
    let mut config = config_for(addr);
    config.api_key = None;
    let client = RouterClient::new(config).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    assert!(matches!(err, RoutingError::Authentication { .. }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_api_key_counts_as_missing() {
    let (addr, connections) = serve(vec![http_response("200 OK", &[], "{}")]).await;
    let mut config = config_for(addr);
    config.api_key = Some(ApiKey::new(""));
    let client = RouterClient::new(config).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    assert!(matches!(err, RoutingError::Authentication { .. }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_communication_error() {
    // Bind to learn a free port, then drop the listener before calling.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RouterClient::new(config_for(addr)).unwrap();
    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    match err {
        RoutingError::Communication { timed_out, .. } => assert!(!timed_out),
        other => panic!("expected Communication, got {other:?}"),
    }
    assert_eq!(
        client.route(InvocationId::new_random(), &request()).await.unwrap_err().retry_policy(),
        RetryPolicy::Retryable { after: None }
    );
}

#[tokio::test]
async fn upstream_401_maps_to_authentication() {
    let body = r#"{"message": "API key rejected"}"#;
    let (addr, _) = serve(vec![http_response("401 Unauthorized", &[], body)]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    match client.route(InvocationId::new_random(), &request()).await.unwrap_err() {
        RoutingError::Authentication { reason } => assert_eq!(reason, "API key rejected"),
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn upstream_429_is_retryable_after_the_advertised_delay() {
    let body = r#"{"message": "rate limited"}"#;
    let (addr, _) = serve(vec![http_response(
        "429 Too Many Requests",
        &[("retry-after", "7")],
        body,
    )])
    .await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    match &err {
        RoutingError::Service {
            status, message, ..
        } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected Service, got {other:?}"),
    }
    assert_eq!(
        err.retry_policy(),
        RetryPolicy::Retryable {
            after: Some(Duration::from_secs(7))
        }
    );
}

#[tokio::test]
async fn upstream_400_surfaces_status_and_message() {
    let body = r#"{"detail": "unknown candidate"}"#;
    let (addr, _) = serve(vec![http_response("400 Bad Request", &[], body)]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    match &err {
        RoutingError::Service {
            status, message, ..
        } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "unknown candidate");
        }
        other => panic!("expected Service, got {other:?}"),
    }
    assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
}

#[tokio::test]
async fn unparseable_success_body_is_invalid_response() {
    let (addr, _) = serve(vec![http_response("200 OK", &[], "not json")]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let err = client.route(InvocationId::new_random(), &request()).await.unwrap_err();
    assert!(matches!(err, RoutingError::InvalidResponse { .. }));
}

#[tokio::test]
async fn sequential_calls_share_no_state() {
    // First call fails upstream; the second succeeds untouched.
    let failure = http_response("500 Internal Server Error", &[], r#"{"message": "boom"}"#);
    let success = http_response(
        "200 OK",
        &[],
        r#"{"selected_model": "gpt-4o", "usage": {"prompt_tokens": 5, "completion_tokens": 1}}"#,
    );
    let (addr, connections) = serve(vec![failure, success]).await;
    let client = RouterClient::new(config_for(addr)).unwrap();

    let request = request();
    let first = client.route(InvocationId::new_random(), &request).await.unwrap_err();
    assert!(matches!(first, RoutingError::Service { status: 500, .. }));

    let second = client.route(InvocationId::new_random(), &request).await.unwrap();
    assert_eq!(second.selected.as_str(), "gpt-4o");
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}
