//! Runs the HTTP endpoint against a loopback server that accepts a single
//! request, records it, and answers with a canned status and body.

use std::collections::HashMap;
use std::time::Duration;

use health_chat_endpoint::{
    ChatEndpoint, EndpointError, ErrorKind, QueryRequest, QueryResponse,
};
use health_chat_http_endpoint::{HttpEndpoint, HttpEndpointConfigBuilder};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::sleep;

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Value,
}

async fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_owned();
        let path = parts.next().unwrap_or_default().to_owned();

        let mut headers = HashMap::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.to_lowercase(), value.trim().to_owned());
            }
        }

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let mut raw_body = vec![0u8; content_length];
        reader.read_exact(&mut raw_body).await.unwrap();
        let request_body =
            serde_json::from_slice(&raw_body).unwrap_or(Value::Null);

        tx.send(CapturedRequest {
            method,
            path,
            headers,
            body: request_body,
        })
        .ok();

        let reply = format!(
            "HTTP/1.1 {status} Canned\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        write_half.write_all(reply.as_bytes()).await.unwrap();
        write_half.shutdown().await.ok();
    });

    (base_url, rx)
}

fn endpoint_for(base_url: &str) -> HttpEndpoint {
    let config = HttpEndpointConfigBuilder::new()
        .with_base_url(base_url)
        .build();
    HttpEndpoint::new(config).unwrap()
}

#[tokio::test]
async fn test_posts_query_as_json() {
    let (base_url, captured) = serve_once(
        200,
        r#"{"response": "Malaria is a mosquito-borne disease."}"#,
    )
    .await;
    let endpoint = endpoint_for(&base_url);

    let resp = endpoint
        .send_query(&QueryRequest::new("What is malaria?"))
        .await
        .unwrap();
    assert_eq!(
        resp,
        QueryResponse::text("Malaria is a mosquito-borne disease.")
    );

    let req = captured.await.unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/chat");
    assert_eq!(
        req.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(req.body, json!({ "query": "What is malaria?" }));
}

#[tokio::test]
async fn test_decodes_markup_and_text() {
    let (base_url, _captured) = serve_once(
        200,
        r#"{"html": "<b>Wash hands</b>", "response": "ignored"}"#,
    )
    .await;
    let endpoint = endpoint_for(&base_url);

    let resp = endpoint
        .send_query(&QueryRequest::new("How do I avoid cholera?"))
        .await
        .unwrap();
    assert_eq!(resp.html.as_deref(), Some("<b>Wash hands</b>"));
    assert_eq!(resp.response.as_deref(), Some("ignored"));
}

#[tokio::test]
async fn test_error_status_with_json_body_is_decoded() {
    let (base_url, _captured) =
        serve_once(400, r#"{"response": "No message received"}"#).await;
    let endpoint = endpoint_for(&base_url);

    let resp = endpoint
        .send_query(&QueryRequest::new("?"))
        .await
        .unwrap();
    assert_eq!(resp, QueryResponse::text("No message received"));
}

#[tokio::test]
async fn test_non_json_body() {
    let (base_url, _captured) =
        serve_once(502, "<html>Bad Gateway</html>").await;
    let endpoint = endpoint_for(&base_url);

    let err = endpoint
        .send_query(&QueryRequest::new("What is dengue?"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedBody);
    assert!(err.message().starts_with("invalid reply body (status 502"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let endpoint = endpoint_for(&base_url);

    let err = endpoint
        .send_query(&QueryRequest::new("What is dengue?"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        // Accept, then never answer.
        let (_stream, _) = listener.accept().await.unwrap();
        sleep(Duration::from_secs(10)).await;
    });

    let config = HttpEndpointConfigBuilder::new()
        .with_base_url(base_url)
        .with_timeout(Duration::from_millis(200))
        .build();
    let endpoint = HttpEndpoint::new(config).unwrap();

    let err = endpoint
        .send_query(&QueryRequest::new("What is dengue?"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
