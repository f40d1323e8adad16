//! Mock extractor for testing.

use super::{ExtractorError, InvoiceExtractor};
use crate::models::ExtractedInvoice;
use async_trait::async_trait;

/// Mock extractor returning a fixed payload.
pub struct MockExtractor {
    fixture: Option<ExtractedInvoice>,
}

impl MockExtractor {
    pub fn new(fixture: Option<ExtractedInvoice>) -> Self {
        Self { fixture }
    }
}

#[async_trait]
impl InvoiceExtractor for MockExtractor {
    async fn extract(
        &self,
        _image_bytes: &[u8],
        _mime_type: &str,
    ) -> Result<ExtractedInvoice, ExtractorError> {
        self.fixture.clone().ok_or_else(|| {
            ExtractorError::NotConfigured("Mock extractor has no fixture".to_string())
        })
    }

    async fn health_check(&self) -> Result<(), ExtractorError> {
        if self.fixture.is_some() {
            Ok(())
        } else {
            Err(ExtractorError::NotConfigured(
                "Mock extractor has no fixture".to_string(),
            ))
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_the_fixture() {
        let fixture: ExtractedInvoice =
            serde_json::from_value(json!({"invoice_number": "INV-9"})).unwrap();
        let extractor = MockExtractor::new(Some(fixture));

        let result = extractor.extract(&[1, 2, 3], "image/png").await.unwrap();
        assert_eq!(result.number(), Some("INV-9"));
        assert!(extractor.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn unconfigured_mock_reports_not_configured() {
        let extractor = MockExtractor::new(None);

        let err = extractor.extract(&[], "image/png").await.unwrap_err();
        assert!(matches!(err, ExtractorError::NotConfigured(_)));
        assert!(extractor.health_check().await.is_err());
    }
}
