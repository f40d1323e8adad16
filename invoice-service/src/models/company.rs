//! Company and address models for invoice-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A resolved company record. Shared between invoices; created lazily by the
/// resolver and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub company_id: Uuid,
    pub company_name: String,
    pub gstin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Billing address owned by exactly one company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub address_id: Uuid,
    pub company_id: Uuid,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub address_type: String,
    pub created_utc: DateTime<Utc>,
}
