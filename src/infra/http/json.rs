use axum::{body::Bytes, extract::State, response::Response, Json};
use serde_json::{json, Value as J};

use crate::core::mcp::{ServerInfo, PROTOCOL_VERSION};
use crate::infra::http::codec::{dispatch_body, respond, FrameCodec, Malformed};
use crate::infra::http_app::AppState;

/// Plain JSON-RPC: the whole body is one request, the reply is one object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRpcCodec;

impl FrameCodec for JsonRpcCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn malformed(&self) -> Malformed {
        Malformed::Reject
    }

    fn split<'a>(&self, body: &'a [u8]) -> Vec<&'a [u8]> {
        vec![body]
    }

    fn encode(&self, json: &str) -> String {
        json.to_owned()
    }
}

/// Discovery document: server identity plus the tool listing.
pub async fn get(State(app): State<AppState>) -> Json<J> {
    let listing = app.dispatcher.listing();
    Json(json!({
        "protocol": format!("mcp/{PROTOCOL_VERSION}"),
        "capabilities": { "tools": {} },
        "serverInfo": ServerInfo::current(),
        "tools": listing.tools,
        "resources": listing.resources,
    }))
}

pub async fn post(State(app): State<AppState>, body: Bytes) -> Response {
    let frames = dispatch_body(&JsonRpcCodec, &app.dispatcher, &body).await;
    respond(&JsonRpcCodec, &frames)
}
