//! Health check handlers.

use crate::services::pipeline_status;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// `GET /api/health`: full component status.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = pipeline_status(&state.db).await;
    let extractor_available = state.extractor.health_check().await.is_ok();

    let code = if status.store_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": if status.store_connected { "healthy" } else { "unhealthy" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "invoice-service",
            "version": env!("CARGO_PKG_VERSION"),
            "extractor_available": extractor_available,
            "extraction_model": state.extractor.model_name(),
            "database_connected": status.store_connected,
            "invoice_count": status.invoice_count,
            "company_count": status.company_count,
        })),
    )
}

/// `GET /api/health/simple`: liveness probe for load balancers.
pub async fn simple_health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
