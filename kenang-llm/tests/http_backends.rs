//! HTTP adapter tests against a throwaway local responder.
//!
//! Each test binds a `TcpListener` on an ephemeral port, serves exactly one
//! canned HTTP response and hands back what the client sent.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use kenang_llm::{BackendProvider, CompletionBackend, CompletionRequest, HttpCompletionClient, LlmError};

/// What the responder saw.
struct Captured {
    request_line: String,
    body: Value,
}

/// Serve one request with `status` and `body`, returning the base URL and a
/// handle resolving to the captured request.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let (head, body_bytes) = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();

        Captured {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            body: serde_json::from_slice(&body_bytes).unwrap_or(Value::Null),
        }
    });

    (format!("http://{addr}"), handle)
}

/// Read headers and a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.expect("read");
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.expect("read body");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    (head, buf[header_end..].to_vec())
}

fn sample_request() -> CompletionRequest {
    CompletionRequest::new("SYSTEM: jadilah ramah", "Halo", 140)
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn relay_posts_request_body_and_reads_reply() {
    let (base_url, server) = respond_once("200 OK", r#"{"reply":"Hai juga!"}"#).await;
    let client = HttpCompletionClient::new(BackendProvider::Relay { base_url });

    let reply = client.complete(&sample_request()).await.expect("reply");
    assert_eq!(reply.reply, "Hai juga!");

    let captured = server.await.expect("server");
    assert!(captured.request_line.starts_with("POST /api/chat "));
    assert_eq!(captured.body["prompt"], "SYSTEM: jadilah ramah");
    assert_eq!(captured.body["message"], "Halo");
    assert_eq!(captured.body["max_tokens"], 140);
    assert_eq!(captured.body["stop"], serde_json::json!(["USER:", "SYSTEM:"]));
}

#[tokio::test]
async fn relay_error_status_is_a_failure() {
    let (base_url, server) = respond_once("500 Internal Server Error", r#"{"reply":"Model lokal belum siap."}"#).await;
    let client = HttpCompletionClient::new(BackendProvider::Relay { base_url });

    let err = client.complete(&sample_request()).await.expect_err("must fail");
    match err {
        LlmError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("belum siap"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    server.await.expect("server");
}

#[tokio::test]
async fn relay_without_reply_field_is_a_parse_error() {
    let (base_url, server) = respond_once("200 OK", r#"{"text":"?"}"#).await;
    let client = HttpCompletionClient::new(BackendProvider::Relay { base_url });

    let err = client.complete(&sample_request()).await.expect_err("must fail");
    assert!(matches!(err, LlmError::ParseError(_)));
    server.await.expect("server");
}

// ---------------------------------------------------------------------------
// llama.cpp
// ---------------------------------------------------------------------------

#[tokio::test]
async fn llama_cpp_sends_raw_prompt_and_reads_content() {
    let (base_url, server) = respond_once("200 OK", r#"{"content":" Halo, ada yang bisa kubantu?"}"#).await;
    let client = HttpCompletionClient::new(BackendProvider::LlamaCpp { base_url });

    let reply = client.complete(&sample_request()).await.expect("reply");
    assert_eq!(reply.reply, " Halo, ada yang bisa kubantu?");

    let captured = server.await.expect("server");
    assert!(captured.request_line.starts_with("POST /completion "));
    assert_eq!(captured.body["prompt"], "SYSTEM: jadilah ramah\nUSER: Halo\nASSISTANT:");
    assert_eq!(captured.body["n_predict"], 140);
    assert!(captured.body.get("message").is_none());
}

#[tokio::test]
async fn llama_cpp_falls_back_to_reply_field() {
    let (base_url, server) = respond_once("200 OK", r#"{"content":"","reply":"dari relay"}"#).await;
    let client = HttpCompletionClient::new(BackendProvider::LlamaCpp { base_url });

    let reply = client.complete(&sample_request()).await.expect("reply");
    assert_eq!(reply.reply, "dari relay");
    server.await.expect("server");
}

#[tokio::test]
async fn llama_cpp_empty_answer_uses_placeholder() {
    let (base_url, server) = respond_once("200 OK", "{}").await;
    let client = HttpCompletionClient::new(BackendProvider::LlamaCpp { base_url });

    let reply = client.complete(&sample_request()).await.expect("reply");
    assert_eq!(reply.reply, "(Tidak ada jawaban)");
    server.await.expect("server");
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_backend_is_unavailable() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpCompletionClient::new(BackendProvider::Relay {
        base_url: format!("http://{addr}"),
    });
    let err = client.complete(&sample_request()).await.expect_err("must fail");
    assert!(matches!(err, LlmError::Unavailable(_)), "got {err:?}");
}

#[tokio::test]
async fn silent_backend_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(socket);
    });

    let client = HttpCompletionClient::new(BackendProvider::Relay {
        base_url: format!("http://{addr}"),
    })
    .with_timeout(Duration::from_millis(100));

    let err = client.complete(&sample_request()).await.expect_err("must fail");
    assert!(matches!(err, LlmError::Timeout(100)), "got {err:?}");
    server.abort();
}

#[tokio::test]
async fn none_provider_never_touches_the_network() {
    let err = HttpCompletionClient::none()
        .complete(&sample_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, LlmError::Unavailable(_)));
}
