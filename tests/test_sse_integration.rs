use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::Router;
use http_body_util::BodyExt; // for .frame
use hyper::{header, Request};
use serde_json::{json, Value as J};
use tokio::time::timeout;
use tower::ServiceExt; // for .oneshot

use quickitquote_mcp::core::error::UpstreamError;
use quickitquote_mcp::infra::config::TransportKind;
use quickitquote_mcp::infra::http_app::{build_app, AppState};
use quickitquote_mcp::tools::search::FnSearch;

const BODY_LIMIT: usize = 1024 * 1024;

fn state(heartbeat: Duration) -> AppState {
    let search = FnSearch::new(|q: String| async move {
        Ok::<_, UpstreamError>(json!({ "results": [{ "title": q }] }))
    });
    AppState::new(Arc::new(search), heartbeat, false)
}

fn app(state: &AppState) -> Router {
    build_app(state.clone(), TransportKind::Ndjson)
}

/// Read body frames until `needle` has been seen or the deadline passes.
async fn read_until(body: &mut Body, needle: &str) -> String {
    let mut seen = String::new();
    let _ = timeout(Duration::from_secs(5), async {
        while let Some(Ok(frame)) = body.frame().await {
            if let Ok(data) = frame.into_data() {
                seen.push_str(&String::from_utf8_lossy(&data));
                if seen.contains(needle) {
                    break;
                }
            }
        }
    })
    .await;
    seen
}

fn first_event(s: &str) -> J {
    let data = s
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("no data event");
    serde_json::from_str(data).unwrap()
}

#[tokio::test]
async fn get_streams_listing_then_heartbeats_and_cleans_up_on_disconnect() {
    let st = state(Duration::from_millis(50));
    let req = Request::builder()
        .method("GET")
        .uri("/api/mcp/sse")
        .header("x-session-id", "client-1")
        .body(Body::empty())
        .unwrap();
    let resp = app(&st).oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(resp.headers()["x-session-id"], "client-1");

    let mut body = resp.into_body();
    let seen = read_until(&mut body, ": heartbeat\n\n").await;
    let listing = first_event(&seen);
    assert_eq!(listing["tools"][0]["name"], "quickitquote_search");
    assert_eq!(listing["resources"], json!([]));
    assert!(seen.contains(": heartbeat\n\n"));
    assert!(st.sse.sessions().contains("client-1"));

    // Client goes away: the session and its heartbeat go with it.
    drop(body);
    assert!(st.sse.sessions().is_empty());
}

#[tokio::test]
async fn initialize_keeps_the_stream_open_with_a_generated_session() {
    let st = state(Duration::from_millis(50));
    let req = Request::builder()
        .method("POST")
        .uri("/api/mcp/sse")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"jsonrpc":"2.0","id":5,"method":"initialize"}"#))
        .unwrap();
    let resp = app(&st).oneshot(req).await.unwrap();
    let session_id = resp.headers()["x-session-id"].to_str().unwrap().to_owned();
    assert!(!session_id.is_empty());

    let mut body = resp.into_body();
    let seen = read_until(&mut body, ": heartbeat").await;
    let init = first_event(&seen);
    assert_eq!(init["id"], 5);
    assert_eq!(init["result"]["serverInfo"]["name"], "quickitquote-mcp");
    assert!(st.sse.sessions().contains(&session_id));

    drop(body);
    assert!(!st.sse.sessions().contains(&session_id));
}

#[tokio::test]
async fn non_initialize_posts_emit_one_event_and_close() {
    let st = state(Duration::from_millis(50));
    let call = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"quickitquote_search","arguments":{"q":"router"}}}"#;
    let req = Request::builder()
        .method("POST")
        .uri("/api/mcp/sse")
        .body(Body::from(call))
        .unwrap();
    let resp = app(&st).oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let s = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(s.starts_with("data: "));
    assert!(s.ends_with("\n\n"));
    let v = first_event(&s);
    assert_eq!(v["id"], 3);
    let text = v["result"]["content"][0]["text"].as_str().unwrap();
    assert_eq!(serde_json::from_str::<J>(text).unwrap(), json!({"results":[{"title":"router"}]}));
    assert!(st.sse.sessions().is_empty());
}

#[tokio::test]
async fn sse_parse_error_and_empty_body() {
    let st = state(Duration::from_millis(50));

    let req = Request::builder()
        .method("POST")
        .uri("/api/mcp/sse")
        .body(Body::from("{broken"))
        .unwrap();
    let resp = app(&st).oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let v = first_event(&String::from_utf8_lossy(&bytes));
    assert_eq!(v["error"]["code"], -32700);

    let req = Request::builder()
        .method("POST")
        .uri("/api/mcp/sse")
        .body(Body::empty())
        .unwrap();
    let resp = app(&st).oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let v = first_event(&String::from_utf8_lossy(&bytes));
    assert_eq!(v["tools"][0]["name"], "quickitquote_search");
}

#[tokio::test]
async fn sse_can_be_mounted_at_root() {
    let st = state(Duration::from_millis(50));
    let app = build_app(st.clone(), TransportKind::Sse);
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::from(r#"{"method":"tools/list","id":2}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let v = first_event(&String::from_utf8_lossy(&bytes));
    assert_eq!(v["id"], 2);
}
