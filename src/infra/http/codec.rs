//! Shared framing for the MCP transports.
//!
//! Each transport is a [`FrameCodec`]: how an inbound body splits into frames,
//! what to do with a frame that is not JSON, and how one outbound frame is
//! written on the wire. Dispatch itself is identical for all of them.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value as J;

use crate::core::dispatch::Dispatcher;
use crate::core::mcp::{self, ResponseFrame};
use crate::tools::registry::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// Log and continue with the next frame.
    Skip,
    /// Answer with a parse error and stop.
    Reject,
}

/// One unit written back to the client.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Outbound {
    Listing(Listing),
    Frame(ResponseFrame),
}

pub trait FrameCodec {
    fn content_type(&self) -> &'static str;

    fn malformed(&self) -> Malformed;

    fn split<'a>(&self, body: &'a [u8]) -> Vec<&'a [u8]>;

    /// Wrap one serialized frame in the transport's wire format.
    fn encode(&self, json: &str) -> String;

    fn cache_control(&self) -> Option<&'static str> {
        None
    }
}

/// Decode `body` into frames and dispatch them in order.
///
/// An empty body short-circuits to the tool listing. Invalid UTF-8 is treated
/// like any other malformed frame.
pub async fn dispatch_body<C>(codec: &C, dispatcher: &Dispatcher, body: &[u8]) -> Vec<Outbound>
where
    C: FrameCodec + ?Sized,
{
    if is_blank(body) {
        return vec![Outbound::Listing(dispatcher.listing())];
    }

    let mut out = Vec::new();
    for raw in codec.split(body) {
        match serde_json::from_slice::<J>(raw) {
            Ok(v) => out.push(Outbound::Frame(dispatcher.dispatch_value(&v).await)),
            Err(e) => match codec.malformed() {
                Malformed::Skip => {
                    tracing::warn!(error = %e, "skipping malformed frame");
                }
                Malformed::Reject => {
                    tracing::warn!(error = %e, "rejecting malformed body");
                    out.push(Outbound::Frame(mcp::parse_error()));
                    break;
                }
            },
        }
    }
    out
}

pub fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

pub fn trim_bytes(mut b: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = b {
        if !first.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    while let [rest @ .., last] = b {
        if !last.is_ascii_whitespace() {
            break;
        }
        b = rest;
    }
    b
}

pub fn render<C>(codec: &C, frames: &[Outbound]) -> Result<String, serde_json::Error>
where
    C: FrameCodec + ?Sized,
{
    frames
        .iter()
        .map(|f| serde_json::to_string(f).map(|s| codec.encode(&s)))
        .collect()
}

/// Buffered response carrying every frame at once.
pub fn respond<C>(codec: &C, frames: &[Outbound]) -> Response
where
    C: FrameCodec + ?Sized,
{
    match render(codec, frames) {
        Ok(body) => {
            let mut resp = body.into_response();
            set_codec_headers(codec, &mut resp);
            resp
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response frames");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn set_codec_headers<C>(codec: &C, resp: &mut Response)
where
    C: FrameCodec + ?Sized,
{
    let headers = resp.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(codec.content_type()));
    if let Some(cc) = codec.cache_control() {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cc));
    }
}
