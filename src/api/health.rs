use axum::Json;
use serde::Serialize;

use crate::core::mcp::SERVER_NAME;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
    pub service: &'static str,
    pub time: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        ok: true,
        service: SERVER_NAME,
        time: chrono::Utc::now().to_rfc3339(),
    })
}
