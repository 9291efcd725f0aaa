use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value as J;
use tokio::time::{interval_at, Instant};

use crate::core::mcp::{self, Operation, RequestFrame};
use crate::infra::http::codec::{
    is_blank, render, respond, set_codec_headers, FrameCodec, Malformed, Outbound,
};
use crate::infra::http_app::AppState;
use crate::infra::runtime::session::SessionRegistry;

pub const SESSION_HEADER: HeaderName = HeaderName::from_static("x-session-id");
pub const HEARTBEAT: &str = ": heartbeat\n\n";

/// Server-sent events: each frame is a `data:` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SseCodec;

impl FrameCodec for SseCodec {
    fn content_type(&self) -> &'static str {
        "text/event-stream"
    }

    fn malformed(&self) -> Malformed {
        Malformed::Reject
    }

    fn split<'a>(&self, body: &'a [u8]) -> Vec<&'a [u8]> {
        vec![body]
    }

    fn encode(&self, json: &str) -> String {
        format!("data: {json}\n\n")
    }

    fn cache_control(&self) -> Option<&'static str> {
        Some("no-cache")
    }
}

/// SSE adapter state: open sessions and the heartbeat period.
#[derive(Clone)]
pub struct SseTransport {
    sessions: SessionRegistry,
    heartbeat: Duration,
}

impl SseTransport {
    pub fn new(heartbeat: Duration) -> Self {
        Self { sessions: SessionRegistry::default(), heartbeat }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Write `first` and keep the connection open with heartbeats until the
    /// client goes away.
    fn open_stream(&self, headers: &HeaderMap, first: Outbound) -> Response {
        let first = match render(&SseCodec, &[first]) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode sse frame");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let session_id = session_id_from(headers);
        let guard = self.sessions.open(session_id.clone());
        let period = self.heartbeat;
        tracing::info!(session_id = %session_id, "sse stream opened");

        let stream = async_stream::stream! {
            let cancel = guard.cancelled();
            yield Ok::<_, Infallible>(first);

            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                let beat = tokio::select! {
                    _ = cancel.cancelled() => false,
                    _ = ticker.tick() => true,
                };
                if !beat {
                    break;
                }
                yield Ok(HEARTBEAT.to_owned());
            }
            tracing::info!(session_id = %guard.id(), "sse stream closed");
        };

        let mut resp = Body::from_stream(stream).into_response();
        set_codec_headers(&SseCodec, &mut resp);
        if let Ok(v) = HeaderValue::from_str(&session_id) {
            resp.headers_mut().insert(SESSION_HEADER, v);
        }
        resp
    }
}

fn session_id_from(headers: &HeaderMap) -> String {
    headers
        .get(&SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

pub async fn get(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let listing = Outbound::Listing(app.dispatcher.listing());
    app.sse.open_stream(&headers, listing)
}

pub async fn post(State(app): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if is_blank(&body) {
        return respond(&SseCodec, &[Outbound::Listing(app.dispatcher.listing())]);
    }

    let raw: J = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed sse body");
            return respond(&SseCodec, &[Outbound::Frame(mcp::parse_error())]);
        }
    };
    let frame = RequestFrame::from_value(&raw);
    let keep_open = frame.operation == Operation::Initialize;
    let reply = Outbound::Frame(app.dispatcher.dispatch(frame).await);

    if keep_open {
        app.sse.open_stream(&headers, reply)
    } else {
        respond(&SseCodec, &[reply])
    }
}
