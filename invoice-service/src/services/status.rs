//! Pipeline status reporting for the health surface.

use crate::services::database::Database;
use serde::Serialize;
use service_core::error::AppError;
use tracing::warn;

/// Snapshot of the pipeline's store dependency. Read-only.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub store_connected: bool,
    pub invoice_count: i64,
    pub company_count: i64,
}

impl PipelineStatus {
    fn disconnected() -> Self {
        Self {
            store_connected: false,
            invoice_count: 0,
            company_count: 0,
        }
    }
}

/// Probe store connectivity and summary counts. Never propagates errors:
/// any failure is reported as a disconnected store.
pub async fn pipeline_status(db: &Database) -> PipelineStatus {
    match query_status(db).await {
        Ok(status) => status,
        Err(err) => {
            warn!(error = %err, "Pipeline status probe failed");
            PipelineStatus::disconnected()
        }
    }
}

async fn query_status(db: &Database) -> Result<PipelineStatus, AppError> {
    db.health_check().await?;
    let invoice_count = db.count_invoices().await?;
    let company_count = db.count_companies().await?;

    Ok(PipelineStatus {
        store_connected: true,
        invoice_count,
        company_count,
    })
}
