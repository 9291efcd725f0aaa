use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value as JsonValue;

use crate::core::error::UpstreamError;
use crate::infra::http::headers::{add_standard_headers, generate_request_id};
use crate::infra::runtime::limits::make_http_client;
use crate::tools::search::SearchBackend;

pub const DEFAULT_BASE_URL: &str = "https://quickitquote.com";

#[derive(Clone)]
pub struct QuickItQuoteRemote {
    base: String,
    http: Client,
}

impl QuickItQuoteRemote {
    pub fn new(base: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            base: base.into(),
            http: make_http_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// One GET against `/api/search`; no retries.
    pub async fn search(&self, q: &str) -> Result<JsonValue, UpstreamError> {
        let url = format!("{}/api/search", self.base.trim_end_matches('/'));
        let req_id = generate_request_id();
        tracing::debug!(endpoint = %url, request_id = %req_id, "quickitquote.search request");

        let start = Instant::now();
        let res = self.fetch(&url, q, req_id).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("upstream_latency_ms").record(elapsed_ms);

        match &res {
            Ok(_) => {
                metrics::counter!("upstream_requests_total", "outcome" => "ok").increment(1);
            }
            Err(e) => {
                metrics::counter!("upstream_requests_total", "outcome" => "error").increment(1);
                tracing::warn!(endpoint = %url, error = %e, elapsed_ms, "quickitquote.search failed");
            }
        }
        res
    }

    async fn fetch(&self, url: &str, q: &str, req_id: String) -> Result<JsonValue, UpstreamError> {
        let (builder, _rid) = add_standard_headers(self.http.get(url), Some(req_id));
        let resp = builder
            .query(&[("q", q)])
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus(status.as_u16()));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl SearchBackend for QuickItQuoteRemote {
    async fn search(&self, q: &str) -> Result<JsonValue, UpstreamError> {
        QuickItQuoteRemote::search(self, q).await
    }
}
