use reqwest::RequestBuilder;

/// Generate a request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    format!("qiq-{}", uuid::Uuid::new_v4().simple())
}

/// Add standard headers to an outgoing request. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder
        .header("x-request-id", rid.as_str())
        .header(
            reqwest::header::USER_AGENT,
            format!("quickitquote-mcp/{}", env!("CARGO_PKG_VERSION")),
        )
        .header(reqwest::header::ACCEPT, "application/json");
    (b, rid)
}
