use crate::models::ExtractedInvoice;
use crate::services::SaveOutcome;
use serde::{Deserialize, Serialize};

/// Response for an extraction attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedInvoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

impl ParseResponse {
    pub fn extracted(data: ExtractedInvoice, processing_time: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time: Some(processing_time),
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            processing_time: None,
        }
    }
}

/// Query parameters for the combined pipeline endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessParams {
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

fn default_auto_save() -> bool {
    true
}

/// Response for the combined extract-then-save pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessAndSaveResponse {
    pub parse_result: ParseResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_result: Option<SaveOutcome>,
    pub pipeline_success: bool,
}
