use std::sync::Arc;

use serde_json::{json, Value as J};

use crate::core::error::DispatchError;
use crate::core::mcp::{self, InitializeResult, Operation, RequestFrame, ResponseFrame, ServerInfo};
use crate::tools::registry::{tool_descriptor, Listing, TOOL_NAME};
use crate::tools::search::SearchBackend;

/// Classifies request frames and produces exactly one response per frame.
#[derive(Clone)]
pub struct Dispatcher {
    search: Arc<dyn SearchBackend>,
}

impl Dispatcher {
    pub fn new(search: Arc<dyn SearchBackend>) -> Self {
        Self { search }
    }

    pub fn search_backend(&self) -> &Arc<dyn SearchBackend> {
        &self.search
    }

    /// Reply used for `GET` probes and empty bodies.
    pub fn listing(&self) -> Listing {
        Listing::current()
    }

    pub async fn dispatch_value(&self, raw: &J) -> ResponseFrame {
        self.dispatch(RequestFrame::from_value(raw)).await
    }

    pub async fn dispatch(&self, frame: RequestFrame) -> ResponseFrame {
        let id = frame.correlation_id();
        tracing::debug!(method = %frame.method, id = %id, "dispatching frame");
        let outcome = match frame.operation {
            Operation::Initialize => Ok(initialize_result()),
            Operation::ListTools => Ok(json!({ "tools": [tool_descriptor()] })),
            Operation::CallTool => self.call_tool(&frame).await,
            Operation::Unknown => Err(DispatchError::MethodNotFound(frame.method.clone())),
        };
        match outcome {
            Ok(result) => {
                tracing::trace!(result = %result, "frame ok");
                mcp::ok(id, result)
            }
            Err(e) => {
                tracing::warn!(method = %frame.method, code = e.code(), error = %e, "frame failed");
                mcp::err(id, &e)
            }
        }
    }

    async fn call_tool(&self, frame: &RequestFrame) -> Result<J, DispatchError> {
        let name = frame.tool.as_deref().unwrap_or_default();
        if name != TOOL_NAME {
            return Err(DispatchError::ToolNotFound(name.to_owned()));
        }
        let q = frame
            .arguments
            .get("q")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| DispatchError::InvalidArgument("q parameter required".into()))?;

        let payload = self.search.search(q).await?;
        Ok(json!({
            "content": [{ "type": "text", "text": payload.to_string() }],
            "structuredContent": payload,
        }))
    }
}

fn initialize_result() -> J {
    let listing = Listing::current();
    let init = InitializeResult {
        protocol_version: mcp::PROTOCOL_VERSION.into(),
        capabilities: json!({ "tools": {} }),
        server_info: ServerInfo::current(),
        tools: listing.tools,
        resources: listing.resources,
    };
    json!(init)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::UpstreamError;
    use crate::tools::search::FnSearch;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(payload: J) -> (Dispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let backend = FnSearch::new(move |_q: String| {
            seen.fetch_add(1, Ordering::SeqCst);
            let payload = payload.clone();
            async move { Ok(payload) }
        });
        (Dispatcher::new(Arc::new(backend)), calls)
    }

    fn failing(e: UpstreamError) -> Dispatcher {
        let backend = FnSearch::new(move |_q: String| {
            let e = e.clone();
            async move { Err::<J, _>(e) }
        });
        Dispatcher::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn list_aliases_yield_identical_payloads() {
        let (d, _) = counting(json!({}));
        let a = d.dispatch_value(&json!({"method":"tools/list","id":4})).await;
        let b = d.dispatch_value(&json!({"method":"tools.list","id":4})).await;
        let c = d.dispatch_value(&json!({"type":"tools.list","id":4})).await;
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.result.unwrap()["tools"][0]["name"], TOOL_NAME);
    }

    #[tokio::test]
    async fn initialize_carries_server_identity_and_tools() {
        let (d, _) = counting(json!({}));
        let r = d.dispatch_value(&json!({"method":"initialize"})).await;
        assert_eq!(r.id, json!(1));
        let result = r.result.unwrap();
        assert_eq!(result["protocolVersion"], mcp::PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "quickitquote-mcp");
        assert_eq!(result["capabilities"], json!({"tools": {}}));
        assert_eq!(result["tools"][0]["name"], TOOL_NAME);
        assert_eq!(result["resources"], json!([]));
    }

    #[tokio::test]
    async fn empty_or_missing_q_is_invalid_and_skips_upstream() {
        let (d, calls) = counting(json!({}));
        for args in [json!({}), json!({"q": ""}), json!({"q": "   "}), json!({"q": 5})] {
            let r = d
                .dispatch_value(&json!({
                    "method":"tools/call","id":2,
                    "params":{"name":TOOL_NAME,"arguments":args}
                }))
                .await;
            let e = r.error.expect("error frame");
            assert_eq!(e.code, -32602);
            assert_eq!(e.message, "q parameter required");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_and_skips_upstream() {
        let (d, calls) = counting(json!({}));
        let r = d
            .dispatch_value(&json!({
                "method":"tools/call","id":3,
                "params":{"name":"other_tool","arguments":{"q":"router"}}
            }))
            .await;
        let e = r.error.unwrap();
        assert_eq!(e.code, -32601);
        assert!(e.message.contains("Tool not found: other_tool"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn call_wraps_upstream_json_verbatim() {
        let upstream = json!({"results":[{"title":"X"}]});
        let (d, calls) = counting(upstream.clone());
        let r = d
            .dispatch_value(&json!({
                "method":"tools/call","id":7,
                "params":{"name":"quickitquote_search","arguments":{"q":"router"}}
            }))
            .await;
        assert_eq!(r.id, json!(7));
        let result = r.result.unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, r#"{"results":[{"title":"X"}]}"#);
        let back: J = serde_json::from_str(text).unwrap();
        assert_eq!(back, upstream);
        assert_eq!(result["structuredContent"], upstream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn legacy_invoke_reads_tool_and_input() {
        let (d, calls) = counting(json!({"ok":true}));
        let r = d
            .dispatch_value(&json!({"type":"tools.invoke","id":"x","tool":TOOL_NAME,"input":{"q":"switch"}}))
            .await;
        assert_eq!(r.id, json!("x"));
        assert!(r.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upstream_failure_becomes_an_error_frame() {
        let d = failing(UpstreamError::BadStatus(503));
        let r = d
            .dispatch_value(&json!({
                "method":"tools/call","id":9,
                "params":{"name":TOOL_NAME,"arguments":{"q":"router"}}
            }))
            .await;
        assert_eq!(r.id, json!(9));
        let e = r.error.unwrap();
        assert_ne!(e.code, 0);
        assert!(e.message.contains("upstream failure"));
        assert!(e.message.contains("503"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (d, _) = counting(json!({}));
        let r = d.dispatch_value(&json!({"method":"nope","id":4})).await;
        let e = r.error.unwrap();
        assert_eq!(e.code, -32601);
        assert_eq!(e.message, "Method not found: nope");
    }
}
