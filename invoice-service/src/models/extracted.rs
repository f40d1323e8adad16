//! Typed model of the payload produced by the AI extraction collaborator.
//!
//! Every optional field on the source document is an `Option`; the pipeline
//! never probes for attribute existence. Dates stay as free-form strings the
//! way the extractor emits them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Extraction confidence reported by the AI model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// One line of the extracted invoice.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractedLineItem {
    pub serial_number: Option<i32>,
    #[validate(length(min = 1, message = "line item description must not be empty"))]
    pub description: String,
    pub hsn_code: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
}

/// Postal address block attached to a company description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
}

/// Vendor or customer block as extracted from the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDescription {
    #[serde(default)]
    pub company_name: String,
    pub gstin: Option<String>,
    pub address: Option<ExtractedAddress>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// GST tax breakdown block; present only when the document shows one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub taxable_amount: Option<Decimal>,
    pub cgst_rate: Option<Decimal>,
    pub cgst_amount: Option<Decimal>,
    pub sgst_rate: Option<Decimal>,
    pub sgst_amount: Option<Decimal>,
    pub igst_rate: Option<Decimal>,
    pub igst_amount: Option<Decimal>,
    pub total_tax: Option<Decimal>,
}

/// The full structured record returned by the extraction collaborator and
/// consumed by the persistence pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractedInvoice {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub vendor_information: Option<CompanyDescription>,
    pub customer_information: Option<CompanyDescription>,
    #[serde(default)]
    #[validate(nested)]
    pub line_items: Vec<ExtractedLineItem>,
    pub tax_calculations: Option<TaxBreakdown>,
    pub gross_amount: Option<Decimal>,
    pub net_amount: Option<Decimal>,
    pub amount_in_words: Option<String>,
    pub qr_code_data: Option<String>,
    #[serde(default)]
    pub extraction_confidence: Confidence,
    pub raw_text: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl ExtractedInvoice {
    /// The invoice number, if present and non-empty.
    pub fn number(&self) -> Option<&str> {
        self.invoice_number.as_deref().filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use validator::Validate;

    #[test]
    fn minimal_payload_gets_defaults() {
        let invoice: ExtractedInvoice = serde_json::from_str("{}").unwrap();
        assert_eq!(invoice.currency, "INR");
        assert_eq!(invoice.extraction_confidence, Confidence::Medium);
        assert!(invoice.line_items.is_empty());
        assert!(invoice.invoice_number.is_none());
        assert!(invoice.number().is_none());
    }

    #[test]
    fn empty_invoice_number_is_treated_as_absent() {
        let invoice: ExtractedInvoice =
            serde_json::from_str(r#"{"invoice_number": ""}"#).unwrap();
        assert!(invoice.number().is_none());
    }

    #[test]
    fn full_payload_deserializes() {
        let json = r#"{
            "invoice_number": "INV-001",
            "invoice_date": "01-04-2025",
            "currency": "INR",
            "vendor_information": {
                "company_name": "Acme",
                "gstin": "G1",
                "address": {"street": "1 Main Rd", "city": "Pune", "state": "MH",
                            "country": "India", "pincode": "411001"}
            },
            "line_items": [
                {"serial_number": 1, "description": "Widget", "amount": 100}
            ],
            "tax_calculations": null,
            "net_amount": 100,
            "extraction_confidence": "high"
        }"#;
        let invoice: ExtractedInvoice = serde_json::from_str(json).unwrap();
        assert_eq!(invoice.number(), Some("INV-001"));
        assert_eq!(invoice.extraction_confidence, Confidence::High);
        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(invoice.line_items[0].amount, Some(Decimal::from(100)));
        assert!(invoice.tax_calculations.is_none());
        let vendor = invoice.vendor_information.as_ref().unwrap();
        assert_eq!(vendor.company_name, "Acme");
        assert_eq!(vendor.gstin.as_deref(), Some("G1"));
    }

    #[test]
    fn line_item_without_description_fails_validation() {
        let json = r#"{"line_items": [{"description": ""}]}"#;
        let invoice: ExtractedInvoice = serde_json::from_str(json).unwrap();
        assert!(invoice.validate().is_err());
    }
}
