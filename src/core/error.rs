use thiserror::Error;

/// Failure talking to the QuickItQuote search API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {0}")]
    BadStatus(u16),
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("upstream sent an invalid response: {0}")]
    InvalidResponse(String),
}

/// Everything the dispatcher can answer with instead of a result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Parse error")]
    Parse,
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
}

impl DispatchError {
    /// JSON-RPC error code carried in the response frame.
    pub fn code(&self) -> i32 {
        match self {
            DispatchError::Parse => -32700,
            DispatchError::MethodNotFound(_) | DispatchError::ToolNotFound(_) => -32601,
            DispatchError::InvalidArgument(_) => -32602,
            DispatchError::Upstream(_) => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_json_rpc_conventions() {
        assert_eq!(DispatchError::Parse.code(), -32700);
        assert_eq!(DispatchError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(DispatchError::ToolNotFound("x".into()).code(), -32601);
        assert_eq!(DispatchError::InvalidArgument("x".into()).code(), -32602);
        assert_eq!(
            DispatchError::Upstream(UpstreamError::BadStatus(503)).code(),
            -32603
        );
    }

    #[test]
    fn upstream_failure_message_names_the_upstream() {
        let e: DispatchError = UpstreamError::BadStatus(503).into();
        assert_eq!(e.to_string(), "upstream failure: upstream returned HTTP 503");
    }
}
