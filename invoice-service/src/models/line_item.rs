//! Persisted line item model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Line item row owned by one invoice. `sort_order` preserves extraction
/// order; `serial_number` is whatever the document printed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LineItem {
    pub line_item_id: Uuid,
    pub invoice_id: Uuid,
    pub serial_number: Option<i32>,
    pub description: String,
    pub hsn_code: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub sort_order: i32,
    pub created_utc: DateTime<Utc>,
}
