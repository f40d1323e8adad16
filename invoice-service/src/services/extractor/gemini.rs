//! Gemini-backed invoice extractor.
//!
//! Sends the invoice image inline (base64) with a structured-JSON prompt and
//! parses the model's reply into an `ExtractedInvoice`.

use super::{ExtractorError, InvoiceExtractor};
use crate::models::ExtractedInvoice;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const EXTRACTION_PROMPT: &str = r#"
You are an expert at extracting structured data from Indian GST-compliant invoices.

Analyze this invoice image and extract the following information in JSON format:

{
  "invoice_number": "string - Invoice number/ID",
  "invoice_date": "string - Invoice date in DD-MM-YYYY format",
  "due_date": "string - Due date if mentioned",
  "currency": "INR",
  "vendor_information": {
    "company_name": "string - Vendor company name",
    "gstin": "string - Vendor GSTIN number",
    "address": {
      "street": "string - Street address",
      "city": "string - City",
      "state": "string - State",
      "country": "string - Country",
      "pincode": "string - PIN code"
    },
    "phone": "string - Phone number",
    "email": "string - Email address"
  },
  "customer_information": {
    "company_name": "string - Customer company name",
    "gstin": "string - Customer GSTIN number",
    "address": {
      "street": "string - Street address",
      "city": "string - City",
      "state": "string - State",
      "country": "string - Country",
      "pincode": "string - PIN code"
    }
  },
  "line_items": [
    {
      "serial_number": "number - Serial number",
      "description": "string - Product/service description",
      "hsn_code": "string - HSN/SAC code",
      "quantity": "number - Quantity",
      "unit": "string - Unit of measurement",
      "rate": "number - Rate per unit",
      "amount": "number - Total amount for this line"
    }
  ],
  "tax_calculations": {
    "taxable_amount": "number - Total taxable amount",
    "cgst_rate": "number - CGST rate percentage",
    "cgst_amount": "number - CGST amount",
    "sgst_rate": "number - SGST rate percentage",
    "sgst_amount": "number - SGST amount",
    "igst_rate": "number - IGST rate percentage",
    "igst_amount": "number - IGST amount",
    "total_tax": "number - Total tax amount"
  },
  "gross_amount": "number - Gross amount before tax",
  "net_amount": "number - Final payable amount",
  "amount_in_words": "string - Amount in words",
  "qr_code_data": "string - QR code content if visible",
  "extraction_confidence": "high/medium/low - Your confidence in the extraction"
}

IMPORTANT INSTRUCTIONS:
1. Extract ALL visible text accurately
2. For GST invoices, focus on GSTIN numbers, HSN codes, and tax breakdowns
3. If a field is not visible or unclear, use null
4. For amounts, extract only numeric values (remove currency symbols)
5. Preserve the exact text for company names and addresses
6. Return ONLY the JSON object, no additional text or explanation

Analyze the invoice now:
"#;

/// Gemini extractor configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Gemini invoice extractor.
pub struct GeminiExtractor {
    config: GeminiConfig,
    client: Client,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the API URL for the given method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            GEMINI_API_BASE, self.config.model, method, self.config.api_key
        )
    }
}

#[async_trait]
impl InvoiceExtractor for GeminiExtractor {
    async fn extract(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<ExtractedInvoice, ExtractorError> {
        if self.config.api_key.is_empty() {
            return Err(ExtractorError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode(image_bytes),
                        },
                    },
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.0),
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            image_len = image_bytes.len(),
            mime_type = mime_type,
            "Sending extraction request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractorError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ExtractorError::RateLimited);
            }

            return Err(ExtractorError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractorError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text.clone()),
                _ => None,
            })
            .ok_or_else(|| {
                ExtractorError::MalformedResponse("Gemini returned no text candidate".to_string())
            })?;

        parse_extraction(&text)
    }

    async fn health_check(&self) -> Result<(), ExtractorError> {
        if self.config.api_key.is_empty() {
            return Err(ExtractorError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!("{}/models?key={}", GEMINI_API_BASE, self.config.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ExtractorError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ExtractorError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Parse the model's reply into an `ExtractedInvoice`, tolerating markdown
/// code fences around the JSON object.
fn parse_extraction(text: &str) -> Result<ExtractedInvoice, ExtractorError> {
    let json = strip_code_fences(text);
    serde_json::from_str(json)
        .map_err(|e| ExtractorError::MalformedResponse(format!("Invalid extraction JSON: {}", e)))
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    #[serde(default)]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}
