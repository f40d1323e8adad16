mod common;

use invoice_service::models::{ExtractedInvoice, Invoice, LineItem, TaxCalculation};
use invoice_service::services::InvoiceWriter;
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn saves_the_full_invoice_graph() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    let outcome = writer.save(&common::full_invoice("INV-001")).await;

    assert!(outcome.success, "save failed: {:?}", outcome.error);
    assert!(!outcome.duplicate);
    assert!(outcome.invoice_id.is_some());

    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 1);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM line_items").await, 2);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM companies").await, 2);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM addresses").await, 1);

    let tax: TaxCalculation = sqlx::query_as(
        r#"
        SELECT tax_calculation_id, invoice_id, taxable_amount,
               cgst_rate, cgst_amount, sgst_rate, sgst_amount,
               igst_rate, igst_amount, total_tax, created_utc
        FROM tax_calculations WHERE invoice_id = $1
        "#,
    )
    .bind(outcome.invoice_id.unwrap())
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(tax.taxable_amount, Some(Decimal::new(35000, 2)));
    assert_eq!(tax.total_tax, Some(Decimal::new(6300, 2)));
    assert!(tax.igst_rate.is_none());
}

#[tokio::test]
#[serial]
async fn rejects_a_duplicate_invoice_number() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    let first = writer.save(&common::full_invoice("INV-002")).await;
    assert!(first.success);

    let second = writer.save(&common::full_invoice("INV-002")).await;
    assert!(!second.success);
    assert!(second.duplicate);
    assert!(second.invoice_id.is_none());
    assert!(second.message.contains("INV-002"));

    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 1);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM line_items").await, 2);
}

#[tokio::test]
#[serial]
async fn numberless_invoices_are_never_duplicates() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    assert!(writer.save(&common::minimal_invoice(None)).await.success);
    assert!(writer.save(&common::minimal_invoice(None)).await.success);

    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 2);
}

#[tokio::test]
#[serial]
async fn empty_invoice_number_is_stored_as_absent() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    assert!(writer.save(&common::minimal_invoice(Some(""))).await.success);
    assert!(writer.save(&common::minimal_invoice(Some(""))).await.success);

    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 2);
    assert_eq!(
        common::count(
            &db,
            "SELECT COUNT(*) FROM invoices WHERE invoice_number IS NULL"
        )
        .await,
        2
    );
}

#[tokio::test]
#[serial]
async fn invoice_without_line_items_or_tax_saves_header_only() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    let invoice: ExtractedInvoice =
        serde_json::from_value(json!({"invoice_number": "INV-003", "net_amount": "42.00"}))
            .unwrap();
    let outcome = writer.save(&invoice).await;

    assert!(outcome.success);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 1);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM line_items").await, 0);
    assert_eq!(
        common::count(&db, "SELECT COUNT(*) FROM tax_calculations").await,
        0
    );
}

#[tokio::test]
#[serial]
async fn line_items_preserve_document_order() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    let invoice: ExtractedInvoice = serde_json::from_value(json!({
        "invoice_number": "INV-004",
        "line_items": [
            {"description": "Zebra feed"},
            {"description": "Apple crates"},
            {"description": "Misc charges"}
        ]
    }))
    .unwrap();
    let outcome = writer.save(&invoice).await;
    assert!(outcome.success);

    let rows: Vec<LineItem> = sqlx::query_as(
        r#"
        SELECT line_item_id, invoice_id, serial_number, description,
               hsn_code, quantity, unit, rate, amount, sort_order, created_utc
        FROM line_items WHERE invoice_id = $1 ORDER BY sort_order
        "#,
    )
    .bind(outcome.invoice_id.unwrap())
    .fetch_all(db.pool())
    .await
    .unwrap();

    let descriptions: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, ["Zebra feed", "Apple crates", "Misc charges"]);
    assert_eq!(rows[0].sort_order, 0);
    assert_eq!(rows[2].sort_order, 2);
}

#[tokio::test]
#[serial]
async fn failed_write_rolls_back_every_table() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    // Amount exceeds the NUMERIC(14,2) column, so the line item insert fails
    // after the vendor and the header were already written in the transaction.
    let invoice: ExtractedInvoice = serde_json::from_value(json!({
        "invoice_number": "INV-005",
        "vendor_information": {"company_name": "Rollback Traders"},
        "line_items": [
            {"description": "Reasonable item", "amount": "10.00"},
            {"description": "Impossible item", "amount": "10000000000000.00"}
        ]
    }))
    .unwrap();

    let outcome = writer.save(&invoice).await;

    assert!(!outcome.success);
    assert!(!outcome.duplicate);
    assert!(outcome.error.is_some());

    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM invoices").await, 0);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM line_items").await, 0);
    assert_eq!(common::count(&db, "SELECT COUNT(*) FROM companies").await, 0);
}

#[tokio::test]
#[serial]
async fn duplicate_check_fails_open_when_the_store_is_down() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    db.pool().close().await;

    assert!(!writer.is_duplicate("INV-001").await);
}

#[tokio::test]
#[serial]
async fn saved_invoice_header_matches_the_extraction() {
    let Some(db) = common::connect().await else {
        eprintln!("skipping: no test database configured");
        return;
    };
    common::reset(&db).await;
    let writer = InvoiceWriter::new(db.clone());

    let outcome = writer.save(&common::full_invoice("INV-006")).await;
    assert!(outcome.success);

    let invoice: Invoice = sqlx::query_as(
        r#"
        SELECT invoice_id, invoice_number, invoice_date, due_date, currency,
               gross_amount, net_amount, amount_in_words, qr_code_data,
               extraction_confidence, raw_text, vendor_id, customer_id, created_utc
        FROM invoices WHERE invoice_id = $1
        "#,
    )
    .bind(outcome.invoice_id.unwrap())
    .fetch_one(db.pool())
    .await
    .unwrap();

    assert_eq!(invoice.invoice_number.as_deref(), Some("INV-006"));
    assert_eq!(invoice.invoice_date.as_deref(), Some("01-04-2025"));
    assert_eq!(invoice.currency, "INR");
    assert_eq!(invoice.net_amount, Some(Decimal::new(35000, 2)));
    assert_eq!(invoice.extraction_confidence, "high");
    assert!(invoice.vendor_id.is_some());
    assert!(invoice.customer_id.is_some());
}
