//! Invoice writer: duplicate guard plus the atomic multi-table save.

use crate::models::ExtractedInvoice;
use crate::services::company::resolve_company;
use crate::services::database::Database;
use crate::services::metrics::{DB_QUERY_DURATION, ERRORS_TOTAL, SAVES_TOTAL};
use serde::Serialize;
use service_core::error::AppError;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Structured result of a save attempt. Every attempt yields one of these;
/// callers never see a bare store error.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    pub duplicate: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    fn saved(invoice_id: Uuid) -> Self {
        Self {
            success: true,
            invoice_id: Some(invoice_id),
            duplicate: false,
            message: "Invoice saved successfully".to_string(),
            error: None,
        }
    }

    fn duplicate(invoice_number: &str) -> Self {
        Self {
            success: false,
            invoice_id: None,
            duplicate: true,
            message: format!("Invoice {} already exists in database", invoice_number),
            error: Some("Duplicate invoice number".to_string()),
        }
    }

    fn constraint_conflict(err: &AppError) -> Self {
        Self {
            success: false,
            invoice_id: None,
            duplicate: false,
            message: "Failed to save invoice due to data constraints".to_string(),
            error: Some(format!("Constraint violation - possible duplicate: {}", err)),
        }
    }

    fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            invoice_id: None,
            duplicate: false,
            message: "Failed to save invoice due to database error".to_string(),
            error: Some(err.to_string()),
        }
    }
}

/// Orchestrates duplicate detection, company resolution and the transactional
/// fan-out write of one extracted invoice into five tables.
#[derive(Clone)]
pub struct InvoiceWriter {
    db: Database,
}

impl InvoiceWriter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Save one extracted invoice. Duplicates short-circuit before any write
    /// transaction is opened; all other errors are absorbed into the outcome
    /// here and nowhere else.
    #[instrument(skip(self, extracted), fields(invoice_number = extracted.number().unwrap_or("")))]
    pub async fn save(&self, extracted: &ExtractedInvoice) -> SaveOutcome {
        if let Some(number) = extracted.number() {
            if self.is_duplicate(number).await {
                info!(invoice_number = number, "Rejected duplicate invoice");
                SAVES_TOTAL.with_label_values(&["duplicate"]).inc();
                return SaveOutcome::duplicate(number);
            }
        }

        match self.write_invoice(extracted).await {
            Ok(invoice_id) => {
                info!(
                    invoice_id = %invoice_id,
                    invoice_number = extracted.number().unwrap_or(""),
                    "Invoice saved"
                );
                SAVES_TOTAL.with_label_values(&["saved"]).inc();
                SaveOutcome::saved(invoice_id)
            }
            Err(err @ AppError::Conflict(_)) => {
                // The pre-check can race a concurrent save on the same number;
                // the unique constraint is the final arbiter.
                warn!(
                    invoice_number = extracted.number().unwrap_or(""),
                    error = %err,
                    "Save rejected by store constraint"
                );
                SAVES_TOTAL.with_label_values(&["conflict"]).inc();
                ERRORS_TOTAL.with_label_values(&["constraint"]).inc();
                SaveOutcome::constraint_conflict(&err)
            }
            Err(err) => {
                error!(
                    invoice_number = extracted.number().unwrap_or(""),
                    error = %err,
                    "Failed to save invoice"
                );
                SAVES_TOTAL.with_label_values(&["failed"]).inc();
                ERRORS_TOTAL.with_label_values(&["store"]).inc();
                SaveOutcome::failure(&err)
            }
        }
    }

    /// Duplicate guard. Empty numbers are never duplicates. A store failure
    /// during the check is reported as "not a duplicate" (fail-open policy:
    /// the unique constraint on invoices.invoice_number remains the final
    /// arbiter inside the write transaction).
    pub async fn is_duplicate(&self, invoice_number: &str) -> bool {
        if invoice_number.is_empty() {
            return false;
        }

        match self.invoice_number_exists(invoice_number).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(
                    invoice_number,
                    error = %err,
                    "Duplicate check failed; treating as not a duplicate"
                );
                ERRORS_TOTAL.with_label_values(&["duplicate_check"]).inc();
                false
            }
        }
    }

    async fn invoice_number_exists(&self, invoice_number: &str) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_number_exists"])
            .start_timer();

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT invoice_id FROM invoices WHERE invoice_number = $1")
                .bind(invoice_number)
                .fetch_optional(self.db.pool())
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to check duplicate invoice: {}",
                        e
                    ))
                })?;

        timer.observe_duration();

        Ok(existing.is_some())
    }

    /// Perform the atomic write: vendor, customer, header, line items, tax
    /// row, all inside one transaction. Any error rolls back the whole graph.
    async fn write_invoice(&self, extracted: &ExtractedInvoice) -> Result<Uuid, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["write_invoice"])
            .start_timer();

        let mut tx = self.db.pool().begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let vendor = resolve_company(&mut tx, extracted.vendor_information.as_ref()).await?;
        let customer = resolve_company(&mut tx, extracted.customer_information.as_ref()).await?;

        let invoice_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO invoices (
                invoice_id, invoice_number, invoice_date, due_date, currency,
                gross_amount, net_amount, amount_in_words, qr_code_data,
                extraction_confidence, raw_text, vendor_id, customer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING invoice_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(extracted.number())
        .bind(&extracted.invoice_date)
        .bind(&extracted.due_date)
        .bind(&extracted.currency)
        .bind(extracted.gross_amount)
        .bind(extracted.net_amount)
        .bind(&extracted.amount_in_words)
        .bind(&extracted.qr_code_data)
        .bind(extracted.extraction_confidence.as_str())
        .bind(&extracted.raw_text)
        .bind(vendor.as_ref().map(|c| c.company_id))
        .bind(customer.as_ref().map(|c| c.company_id))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error("Failed to create invoice", e))?;

        for (index, item) in extracted.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO line_items (
                    line_item_id, invoice_id, serial_number, description,
                    hsn_code, quantity, unit, rate, amount, sort_order
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(invoice_id)
            .bind(item.serial_number)
            .bind(&item.description)
            .bind(&item.hsn_code)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.rate)
            .bind(item.amount)
            .bind(index as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to create line item", e))?;
        }

        if let Some(tax) = &extracted.tax_calculations {
            sqlx::query(
                r#"
                INSERT INTO tax_calculations (
                    tax_calculation_id, invoice_id, taxable_amount,
                    cgst_rate, cgst_amount, sgst_rate, sgst_amount,
                    igst_rate, igst_amount, total_tax
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(invoice_id)
            .bind(tax.taxable_amount)
            .bind(tax.cgst_rate)
            .bind(tax.cgst_amount)
            .bind(tax.sgst_rate)
            .bind(tax.sgst_amount)
            .bind(tax.igst_rate)
            .bind(tax.igst_amount)
            .bind(tax.total_tax)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("Failed to create tax calculation", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_write_error("Failed to commit invoice", e))?;

        timer.observe_duration();

        Ok(invoice_id)
    }
}

/// Classify a store error from the write path: unique violations become
/// `Conflict`, everything else `DatabaseError`.
pub fn map_write_error(context: &str, e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(anyhow::anyhow!("{}: {}", context, e))
        }
        _ => AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e)),
    }
}
