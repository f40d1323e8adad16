//! Persisted tax calculation model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// GST breakdown row; at most one per invoice.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxCalculation {
    pub tax_calculation_id: Uuid,
    pub invoice_id: Uuid,
    pub taxable_amount: Option<Decimal>,
    pub cgst_rate: Option<Decimal>,
    pub cgst_amount: Option<Decimal>,
    pub sgst_rate: Option<Decimal>,
    pub sgst_amount: Option<Decimal>,
    pub igst_rate: Option<Decimal>,
    pub igst_amount: Option<Decimal>,
    pub total_tax: Option<Decimal>,
    pub created_utc: DateTime<Utc>,
}
