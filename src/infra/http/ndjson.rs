use axum::{body::Bytes, extract::State, response::Response};

use crate::infra::http::codec::{
    dispatch_body, is_blank, respond, trim_bytes, FrameCodec, Malformed, Outbound,
};
use crate::infra::http_app::AppState;

/// Newline-delimited JSON: one frame per line in, one line per response out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonCodec;

impl FrameCodec for NdjsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn malformed(&self) -> Malformed {
        Malformed::Skip
    }

    fn split<'a>(&self, body: &'a [u8]) -> Vec<&'a [u8]> {
        body.split(|b| *b == b'\n')
            .map(trim_bytes)
            .filter(|l| !is_blank(l))
            .collect()
    }

    fn encode(&self, json: &str) -> String {
        format!("{json}\n")
    }
}

pub async fn get(State(app): State<AppState>) -> Response {
    respond(&NdjsonCodec, &[Outbound::Listing(app.dispatcher.listing())])
}

pub async fn post(State(app): State<AppState>, body: Bytes) -> Response {
    let frames = dispatch_body(&NdjsonCodec, &app.dispatcher, &body).await;
    tracing::debug!(frames = frames.len(), "ndjson body handled");
    respond(&NdjsonCodec, &frames)
}
