//! AI extraction collaborator abstractions and implementations.
//!
//! The pipeline treats extraction as an opaque call: image bytes in, a typed
//! `ExtractedInvoice` (or an error) out. A trait keeps the Gemini backend
//! swappable with a mock for tests.

pub mod gemini;
pub mod mock;

use crate::models::ExtractedInvoice;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for extractor operations.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Extractor not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),
}

/// Trait for invoice extraction backends.
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    /// Extract structured invoice data from a document image.
    async fn extract(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<ExtractedInvoice, ExtractorError>;

    /// Verify the backend is reachable and configured.
    async fn health_check(&self) -> Result<(), ExtractorError>;

    /// Name of the underlying model, for health reporting.
    fn model_name(&self) -> &str;
}
