//! Plain REST proxy: `GET /api/search?q=`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as J};

use crate::core::error::UpstreamError;
use crate::infra::http_app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Raw,
    Compact,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub format: Option<Format>,
}

pub async fn search(State(app): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let q = params.q.trim();
    if q.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing query parameter q" })),
        )
            .into_response();
    }

    let compact = match params.format {
        Some(Format::Compact) => true,
        Some(Format::Raw) => false,
        None => app.reshape_results,
    };

    match app.dispatcher.search_backend().search(q).await {
        Ok(payload) if compact => Json(reshape(payload)).into_response(),
        Ok(payload) => Json(payload).into_response(),
        Err(UpstreamError::BadStatus(code)) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": format!("Upstream error {code}") }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal error", "details": e.to_string() })),
        )
            .into_response(),
    }
}

/// Rewrite each `results[]` entry as `{title, url, snippet, score}`.
///
/// Payloads without a `results` array pass through untouched.
pub fn reshape(mut payload: J) -> J {
    if let Some(results) = payload.get_mut("results").and_then(J::as_array_mut) {
        for entry in results.iter_mut() {
            *entry = compact_entry(entry);
        }
    }
    payload
}

fn compact_entry(entry: &J) -> J {
    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| entry.get(*k).filter(|v| !v.is_null()))
            .cloned()
            .unwrap_or(J::Null)
    };
    json!({
        "title": pick(&["title", "name"]),
        "url": pick(&["url", "link"]),
        "snippet": pick(&["snippet", "description"]),
        "score": pick(&["score"]),
    })
}
