//! Invoice upload, extraction and persistence handlers.

use crate::dtos::{ParseResponse, ProcessAndSaveResponse, ProcessParams};
use crate::models::ExtractedInvoice;
use crate::services::metrics::EXTRACTIONS_TOTAL;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use std::time::Instant;
use tracing::{info, warn};
use validator::Validate;

const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Validate an uploaded file before extraction.
fn validate_upload(data: &[u8], content_type: &str, max_bytes: usize) -> Result<(), AppError> {
    if data.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Empty file uploaded")));
    }

    if data.len() > max_bytes {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "File too large. Maximum size: {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Unsupported file type: {}. Supported: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    Ok(())
}

async fn read_upload(multipart: &mut Multipart) -> Result<(Vec<u8>, String, String), AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e)))?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let filename = field.file_name().unwrap_or("invoice").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
        .to_vec();

    Ok((data, content_type, filename))
}

async fn extract(state: &AppState, data: &[u8], content_type: &str, filename: &str) -> ParseResponse {
    let started = Instant::now();

    match state.extractor.extract(data, content_type).await {
        Ok(invoice) => {
            let elapsed = started.elapsed().as_secs_f64();
            info!(
                filename,
                invoice_number = invoice.number().unwrap_or(""),
                processing_time = elapsed,
                "Invoice extraction completed"
            );
            EXTRACTIONS_TOTAL.with_label_values(&["extracted"]).inc();
            ParseResponse::extracted(invoice, elapsed)
        }
        Err(err) => {
            warn!(filename, error = %err, "Invoice extraction failed");
            EXTRACTIONS_TOTAL.with_label_values(&["failed"]).inc();
            ParseResponse::failed(format!("Processing error: {}", err))
        }
    }
}

/// `POST /api/parse-invoice`: extract structured data from an uploaded image.
pub async fn parse_invoice(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let (data, content_type, filename) = read_upload(&mut multipart).await?;
    validate_upload(&data, &content_type, state.config.upload.max_bytes)?;

    Ok(Json(extract(&state, &data, &content_type, &filename).await))
}

/// `POST /api/save-invoice`: persist an extracted invoice payload.
///
/// Duplicates come back as 409 with the same structured body so callers can
/// tell an expected no-op from a hard failure.
pub async fn save_invoice(
    State(state): State<AppState>,
    Json(payload): Json<ExtractedInvoice>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = state.writer.save(&payload).await;

    let status = if outcome.success {
        StatusCode::OK
    } else if outcome.duplicate {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(outcome)))
}

/// `POST /api/process-and-save`: extract and optionally persist in one call.
pub async fn process_and_save(
    State(state): State<AppState>,
    Query(params): Query<ProcessParams>,
    mut multipart: Multipart,
) -> Result<Json<ProcessAndSaveResponse>, AppError> {
    let (data, content_type, filename) = read_upload(&mut multipart).await?;
    validate_upload(&data, &content_type, state.config.upload.max_bytes)?;

    let parse_result = extract(&state, &data, &content_type, &filename).await;

    let save_result = match (&parse_result.data, params.auto_save) {
        (Some(invoice), true) => {
            invoice.validate()?;
            Some(state.writer.save(invoice).await)
        }
        _ => None,
    };

    let pipeline_success = parse_result.success
        && (!params.auto_save || save_result.as_ref().is_some_and(|s| s.success));

    Ok(Json(ProcessAndSaveResponse {
        parse_result,
        save_result,
        pipeline_success,
    }))
}

/// `GET /api/supported-formats`: upload format information for clients.
pub async fn supported_formats(State(state): State<AppState>) -> impl IntoResponse {
    let max_size = format!("{}MB", state.config.upload.max_bytes / (1024 * 1024));

    Json(json!({
        "supported_formats": [
            {
                "type": "JPEG/JPG",
                "mime_types": ["image/jpeg", "image/jpg"],
                "max_size": max_size,
                "recommended": true
            },
            {
                "type": "PNG",
                "mime_types": ["image/png"],
                "max_size": max_size,
                "recommended": true
            },
            {
                "type": "WEBP",
                "mime_types": ["image/webp"],
                "max_size": max_size,
                "recommended": false
            }
        ],
        "recommendations": [
            "Use high-resolution images (minimum 300 DPI)",
            "Ensure good lighting and minimal shadows",
            "Keep text clearly visible and unobstructed"
        ]
    }))
}
