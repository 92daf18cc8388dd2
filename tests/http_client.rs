//! Integration tests for the HTTP + SSE client.
//!
//! Each test binds a one-shot listener that captures the request and
//! answers with a canned HTTP response.

use content_mcp::mcp::client::{ClientError, McpClient};
use content_mcp::mcp::protocol::RequestId;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the one-shot server.
struct Captured {
    head: String,
    body: Value,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// Serves exactly one request, replying with `content_type` and `body`.
async fn one_shot(status: &'static str, content_type: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let (head, body_start, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8(buf[..pos].to_vec()).unwrap();
                let length = head
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        key.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                break (head, pos + 4, length);
            }
        };
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        Captured {
            head,
            body: serde_json::from_slice(&buf[body_start..body_start + content_length]).unwrap(),
        }
    });

    (base_url, handle)
}

#[tokio::test]
async fn call_tool_reads_first_data_frame() {
    let (base_url, server) = one_shot(
        "200 OK",
        "text/event-stream",
        "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"content\":[{\"type\":\"text\",\"text\":\"Pages:\"}]}}\n\n",
    )
    .await;

    let client = McpClient::new(&base_url, "secret-token");
    let response = client
        .call_tool("list_pages", json!({"limit": 5}))
        .await
        .unwrap();
    assert_eq!(response.id, Some(RequestId::Number(1)));
    assert_eq!(response.result().unwrap()["content"][0]["text"], "Pages:");

    let request = server.await.unwrap();
    assert!(request.head.starts_with("POST /api/plugin/mcp "));
    assert_eq!(request.header("authorization"), Some("Bearer secret-token"));
    assert_eq!(
        request.header("accept"),
        Some("application/json, text/event-stream")
    );
    assert_eq!(request.body["jsonrpc"], "2.0");
    assert_eq!(request.body["id"], 1);
    assert_eq!(request.body["method"], "tools/call");
    assert_eq!(request.body["params"]["name"], "list_pages");
    assert_eq!(request.body["params"]["arguments"]["limit"], 5);
}

#[tokio::test]
async fn missing_data_frame_is_an_error() {
    let (base_url, server) = one_shot("200 OK", "text/event-stream", ": keep-alive\n\n").await;

    let client = McpClient::new(&base_url, "t");
    let err = client.call_tool("list_posts", json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingDataFrame));

    server.await.unwrap();
}

#[tokio::test]
async fn json_error_response_is_returned_as_ok() {
    let (base_url, server) = one_shot(
        "200 OK",
        "application/json",
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"error\":{\"code\":-32603,\"message\":\"Page 3 not found\"}}",
    )
    .await;

    let client = McpClient::new(&base_url, "t");
    let response = client.call_tool("delete_page", json!({"id": 3})).await.unwrap();
    let error = response.error().unwrap();
    assert_eq!(error.code, -32603);
    assert_eq!(error.message, "Page 3 not found");

    server.await.unwrap();
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base_url, server) = one_shot("401 Unauthorized", "text/plain", "bad token").await;

    let client = McpClient::new(&base_url, "wrong");
    let err = client.list_tools().await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "bad token");
        }
        other => panic!("Expected status error, got {other:?}"),
    }

    let request = server.await.unwrap();
    assert_eq!(request.body["method"], "tools/list");
}

#[tokio::test]
async fn initialize_round_trip() {
    let (base_url, server) = one_shot(
        "200 OK",
        "text/event-stream",
        "data: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"protocolVersion\":\"2024-11-05\",\"capabilities\":{\"tools\":{}},\"serverInfo\":{\"name\":\"content-mcp\",\"version\":\"0.1.0\"}}}\n\n",
    )
    .await;

    let client = McpClient::new(&base_url, "t");
    let response = client.initialize().await.unwrap();
    let result = response.result().unwrap();
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "content-mcp");

    let request = server.await.unwrap();
    assert_eq!(request.body["method"], "initialize");
    assert_eq!(request.body["id"], 1);
    assert!(request.body.get("params").is_none());
}
