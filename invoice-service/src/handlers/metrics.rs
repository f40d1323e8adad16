//! Prometheus metrics endpoint.

use crate::services::get_metrics;
use axum::response::IntoResponse;

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
