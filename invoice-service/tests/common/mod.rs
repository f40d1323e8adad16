#![allow(dead_code)]

use invoice_service::models::ExtractedInvoice;
use invoice_service::services::Database;
use serde_json::json;

/// Connect to the test database, or `None` when no database is configured.
/// Tests that get `None` print a notice and pass, so the suite stays runnable
/// on machines without Postgres.
pub async fn connect() -> Option<Database> {
    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    let db = Database::new(&url, 5, 1)
        .await
        .expect("failed to connect to test database");
    db.run_migrations()
        .await
        .expect("failed to run migrations on test database");

    Some(db)
}

/// Wipe every pipeline table between tests.
pub async fn reset(db: &Database) {
    sqlx::query("TRUNCATE tax_calculations, line_items, invoices, addresses, companies CASCADE")
        .execute(db.pool())
        .await
        .expect("failed to reset test database");
}

pub async fn count(db: &Database, query: &str) -> i64 {
    sqlx::query_scalar(query)
        .fetch_one(db.pool())
        .await
        .expect("count query failed")
}

/// A realistic extraction result with vendor, customer, two line items and a
/// tax block.
pub fn full_invoice(number: &str) -> ExtractedInvoice {
    serde_json::from_value(json!({
        "invoice_number": number,
        "invoice_date": "01-04-2025",
        "due_date": "15-04-2025",
        "currency": "INR",
        "vendor_information": {
            "company_name": "Acme Supplies Pvt Ltd",
            "gstin": "27AAACA1234A1Z5",
            "address": {
                "street": "12 Industrial Estate",
                "city": "Pune",
                "state": "Maharashtra",
                "country": "India",
                "pincode": "411001"
            },
            "phone": "+91-9800000001",
            "email": "billing@acme.example"
        },
        "customer_information": {
            "company_name": "Globex Traders",
            "gstin": "29AAACG5678B1Z3"
        },
        "line_items": [
            {"serial_number": 1, "description": "Widget", "hsn_code": "8471",
             "quantity": "2", "unit": "pcs", "rate": "50.00", "amount": "100.00"},
            {"serial_number": 2, "description": "Gadget", "hsn_code": "8473",
             "quantity": "1", "unit": "pcs", "rate": "250.00", "amount": "250.00"}
        ],
        "tax_calculations": {
            "taxable_amount": "350.00",
            "cgst_rate": "9", "cgst_amount": "31.50",
            "sgst_rate": "9", "sgst_amount": "31.50",
            "total_tax": "63.00"
        },
        "gross_amount": "413.00",
        "net_amount": "350.00",
        "amount_in_words": "Four hundred thirteen rupees only",
        "extraction_confidence": "high"
    }))
    .expect("fixture must deserialize")
}

/// A minimal extraction result with just a number and one line item.
pub fn minimal_invoice(number: Option<&str>) -> ExtractedInvoice {
    serde_json::from_value(json!({
        "invoice_number": number,
        "line_items": [
            {"description": "Consulting services", "amount": "500.00"}
        ],
        "net_amount": "500.00"
    }))
    .expect("fixture must deserialize")
}

/// An invoice whose only vendor detail is what the caller passes in.
pub fn invoice_with_vendor(
    number: &str,
    company_name: &str,
    gstin: Option<&str>,
) -> ExtractedInvoice {
    serde_json::from_value(json!({
        "invoice_number": number,
        "vendor_information": {
            "company_name": company_name,
            "gstin": gstin
        },
        "line_items": [],
        "net_amount": "100.00"
    }))
    .expect("fixture must deserialize")
}
