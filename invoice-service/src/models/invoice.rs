//! Persisted invoice header model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice header row. Immutable once written; root of the save transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub currency: String,
    pub gross_amount: Option<Decimal>,
    pub net_amount: Option<Decimal>,
    pub amount_in_words: Option<String>,
    pub qr_code_data: Option<String>,
    pub extraction_confidence: String,
    pub raw_text: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
}
