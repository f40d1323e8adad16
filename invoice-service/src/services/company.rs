//! Company entity resolution: get an existing company or create one.
//!
//! Runs on the connection of the caller's open transaction so a freshly
//! created company and the invoice that references it commit together.

use crate::models::{Company, CompanyDescription};
use crate::services::invoice::map_write_error;
use service_core::error::AppError;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

/// Resolve a company description to a stored `Company`.
///
/// Lookup order: exact GSTIN match, then exact name match (no normalization),
/// then insert. An absent description or an empty name resolves to `None`
/// without touching the store. Existing companies are returned as-is; their
/// fields are never updated from the description.
pub async fn resolve_company(
    conn: &mut PgConnection,
    description: Option<&CompanyDescription>,
) -> Result<Option<Company>, AppError> {
    let Some(info) = description else {
        return Ok(None);
    };
    if info.company_name.is_empty() {
        return Ok(None);
    }

    let gstin = info.gstin.as_deref().filter(|g| !g.is_empty());

    if let Some(gstin) = gstin {
        let existing = sqlx::query_as::<_, Company>(
            r#"
            SELECT company_id, company_name, gstin, phone, email, created_utc
            FROM companies
            WHERE gstin = $1
            "#,
        )
        .bind(gstin)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to look up company by GSTIN: {}", e))
        })?;

        if let Some(company) = existing {
            return Ok(Some(company));
        }
    }

    let existing = sqlx::query_as::<_, Company>(
        r#"
        SELECT company_id, company_name, gstin, phone, email, created_utc
        FROM companies
        WHERE company_name = $1
        "#,
    )
    .bind(&info.company_name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| {
        AppError::DatabaseError(anyhow::anyhow!("Failed to look up company by name: {}", e))
    })?;

    if let Some(company) = existing {
        return Ok(Some(company));
    }

    let company = sqlx::query_as::<_, Company>(
        r#"
        INSERT INTO companies (company_id, company_name, gstin, phone, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING company_id, company_name, gstin, phone, email, created_utc
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&info.company_name)
    .bind(gstin)
    .bind(&info.phone)
    .bind(&info.email)
    .fetch_one(&mut *conn)
    .await
    // A racing insert on the same GSTIN hits the partial unique index; that
    // must classify as a conflict, not a generic store failure.
    .map_err(|e| map_write_error("Failed to create company", e))?;

    if let Some(address) = &info.address {
        sqlx::query(
            r#"
            INSERT INTO addresses (address_id, company_id, street, city, state, country, pincode, address_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'billing')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company.company_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.country)
        .bind(&address.pincode)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create address: {}", e)))?;
    }

    info!(company_id = %company.company_id, name = %company.company_name, "Created new company");

    Ok(Some(company))
}
