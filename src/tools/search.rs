//! The seam between the dispatcher and whatever answers search queries.

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value as JsonValue;

use crate::core::error::UpstreamError;

/// Anything that can answer a QuickItQuote search with raw JSON.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync + 'static {
    async fn search(&self, q: &str) -> Result<JsonValue, UpstreamError>;
}

type SearchFuture = Pin<Box<dyn Future<Output = Result<JsonValue, UpstreamError>> + Send>>;

/// Thin wrapper around a boxed async fn, so callers can plug in a backend
/// without a dedicated type.
pub struct FnSearch {
    inner: Arc<dyn Fn(String) -> SearchFuture + Send + Sync>,
}

impl FnSearch {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JsonValue, UpstreamError>> + Send + 'static,
    {
        Self { inner: Arc::new(move |s| Box::pin(f(s))) }
    }
}

#[async_trait::async_trait]
impl SearchBackend for FnSearch {
    async fn search(&self, q: &str) -> Result<JsonValue, UpstreamError> {
        (self.inner)(q.to_owned()).await
    }
}
