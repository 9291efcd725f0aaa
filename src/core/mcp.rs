//! Frame types shared by every transport.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as J};

use crate::core::error::DispatchError;
use crate::tools::registry::ToolDescriptor;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "quickitquote-mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    ListTools,
    CallTool,
    Unknown,
}

impl Operation {
    /// Map a method (or legacy `type`) name onto an operation.
    pub fn from_name(name: &str) -> Self {
        match name {
            "initialize" => Operation::Initialize,
            "tools/list" | "tools.list" => Operation::ListTools,
            "tools/call" | "tools.invoke" | "tools.call" => Operation::CallTool,
            _ => Operation::Unknown,
        }
    }
}

/// One decoded unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFrame {
    pub operation: Operation,
    /// The name the caller used, kept for error messages.
    pub method: String,
    pub id: Option<J>,
    pub tool: Option<String>,
    pub arguments: Map<String, J>,
}

impl RequestFrame {
    /// Classify a raw JSON object.
    ///
    /// Operations are tried in the order initialize, list, call; each one
    /// matches if either `method` or the legacy `type` field names it.
    pub fn from_value(raw: &J) -> Self {
        let names: Vec<&str> = ["method", "type"]
            .iter()
            .filter_map(|k| raw.get(*k).and_then(J::as_str))
            .collect();
        let (operation, method) = [Operation::Initialize, Operation::ListTools, Operation::CallTool]
            .into_iter()
            .find_map(|op| {
                names
                    .iter()
                    .find(|n| Operation::from_name(n) == op)
                    .map(|n| (op, (*n).to_owned()))
            })
            .unwrap_or_else(|| {
                let shown = names.first().copied().unwrap_or("<missing>");
                (Operation::Unknown, shown.to_owned())
            });

        let id = raw.get("id").filter(|v| !v.is_null()).cloned();
        let params = raw.get("params");
        let tool = params
            .and_then(|p| p.get("name"))
            .or_else(|| raw.get("tool"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .or_else(|| raw.get("input"))
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        Self {
            operation,
            method,
            id,
            tool,
            arguments,
        }
    }

    /// Correlation id for the reply: echoed when present, `1` otherwise.
    pub fn correlation_id(&self) -> J {
        self.id.clone().unwrap_or_else(|| J::from(1))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResponseFrame {
    pub jsonrpc: &'static str,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
}

pub fn ok(id: J, result: J) -> ResponseFrame {
    ResponseFrame { jsonrpc: "2.0", id, result: Some(result), error: None }
}

pub fn err(id: J, e: &DispatchError) -> ResponseFrame {
    ResponseFrame {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(RpcErr { code: e.code(), message: e.to_string() }),
    }
}

/// Reply to a body that could not be decoded; there is no id to echo.
pub fn parse_error() -> ResponseFrame {
    err(J::Null, &DispatchError::Parse)
}

// --- Initialize result ---

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: J,
    pub server_info: ServerInfo,
    pub tools: Vec<ToolDescriptor>,
    pub resources: Vec<J>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl ServerInfo {
    pub fn current() -> Self {
        Self { name: SERVER_NAME.into(), version: env!("CARGO_PKG_VERSION").into() }
    }
}
