use std::sync::OnceLock;

use serde::Serialize;
use serde_json::{json, Value as J};

pub const TOOL_NAME: &str = "quickitquote_search";

/// Static metadata for the one tool this service exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: J,
}

pub fn tool_descriptor() -> &'static ToolDescriptor {
    static DESCRIPTOR: OnceLock<ToolDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(|| ToolDescriptor {
        name: TOOL_NAME,
        description: "Search QuickItQuote API",
        input_schema: json!({
            "type": "object",
            "properties": { "q": { "type": "string", "description": "Search query" } },
            "required": ["q"]
        }),
    })
}

/// The bare probe reply: `{"tools": [...], "resources": []}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub tools: Vec<ToolDescriptor>,
    pub resources: Vec<J>,
}

impl Listing {
    pub fn current() -> Self {
        Self { tools: vec![tool_descriptor().clone()], resources: Vec::new() }
    }
}
