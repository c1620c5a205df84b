//! # Database Queries
//!
//! SQL for the single-statement operations. The multi-row redemption write
//! lives in `redemption.rs`.
//!
//! ## Query Organization
//!
//! - `brand_*` / `create_brand` - Brand table operations
//! - `voucher_*` / `create_voucher` - Voucher table operations
//! - `transaction_*` - Read side of redemptions
//!
//! ## Error Handling
//!
//! All queries return `Result<T, DatabaseError>`. Lookups by ID return
//! `Option`; callers decide whether absence is an error.

use deadpool_postgres::{Object, Pool};
use tokio_postgres::Row;
use tracing::{debug, info};

use super::models::*;
use super::DatabaseError;

// ============================================
// HELPER FUNCTIONS
// ============================================

/// Check a client out of the pool.
pub(crate) async fn checkout(pool: &Pool) -> Result<Object, DatabaseError> {
    pool.get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
}

fn row_to_brand(row: &Row) -> Result<Brand, DatabaseError> {
    Ok(Brand {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
    })
}

fn row_to_voucher(row: &Row) -> Result<Voucher, DatabaseError> {
    Ok(Voucher {
        id: row.try_get("id")?,
        brand_id: row.try_get("brand_id")?,
        cost_in_points: row.try_get("cost_in_points")?,
        voucher_code: row.try_get("voucher_code")?,
    })
}

pub(crate) fn row_to_transaction(row: &Row) -> Result<Transaction, DatabaseError> {
    Ok(Transaction {
        id: row.try_get("id")?,
        customer_id: row.try_get("customer_id")?,
        total_cost_in_points: row.try_get("total_cost_in_points")?,
    })
}

// ============================================
// BRAND QUERIES
// ============================================

/// Insert a brand and return it with its assigned ID.
pub async fn create_brand(
    pool: &Pool,
    name: &str,
    description: &str,
) -> Result<Brand, DatabaseError> {
    debug!("Creating brand: {}", name);

    let client = checkout(pool).await?;

    let row = client
        .query_one(
            r#"
            INSERT INTO brands (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
            &[&name, &description],
        )
        .await
        .map_err(DatabaseError::from_query)?;

    let brand = row_to_brand(&row)?;
    info!("Brand created: {} ({})", brand.id, brand.name);
    Ok(brand)
}

// ============================================
// VOUCHER QUERIES
// ============================================

/// Insert a voucher and return the full row.
///
/// An unknown `brand_id` trips the foreign key and comes back as
/// `DatabaseError::ConstraintViolation`.
pub async fn create_voucher(
    pool: &Pool,
    brand_id: i64,
    cost_in_points: f64,
    voucher_code: &str,
) -> Result<Voucher, DatabaseError> {
    debug!("Creating voucher {} for brand {}", voucher_code, brand_id);

    let client = checkout(pool).await?;

    let row = client
        .query_one(
            r#"
            INSERT INTO vouchers (brand_id, cost_in_points, voucher_code)
            VALUES ($1, $2, $3)
            RETURNING id, brand_id, cost_in_points, voucher_code
            "#,
            &[&brand_id, &cost_in_points, &voucher_code],
        )
        .await
        .map_err(DatabaseError::from_query)?;

    let voucher = row_to_voucher(&row)?;
    info!("Voucher created: {} (brand {})", voucher.id, voucher.brand_id);
    Ok(voucher)
}

/// Get a voucher by ID.
pub async fn get_voucher_by_id(pool: &Pool, id: i64) -> Result<Option<Voucher>, DatabaseError> {
    debug!("Fetching voucher: {}", id);

    let client = checkout(pool).await?;

    let row = client
        .query_opt(
            r#"
            SELECT id, brand_id, cost_in_points, voucher_code
            FROM vouchers
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    row.as_ref().map(row_to_voucher).transpose()
}

/// Get every voucher issued by a brand, oldest first.
pub async fn get_vouchers_by_brand(
    pool: &Pool,
    brand_id: i64,
) -> Result<Vec<Voucher>, DatabaseError> {
    debug!("Fetching vouchers for brand: {}", brand_id);

    let client = checkout(pool).await?;

    let rows = client
        .query(
            r#"
            SELECT id, brand_id, cost_in_points, voucher_code
            FROM vouchers
            WHERE brand_id = $1
            ORDER BY id ASC
            "#,
            &[&brand_id],
        )
        .await?;

    rows.iter().map(row_to_voucher).collect()
}

// ============================================
// TRANSACTION QUERIES
// ============================================

/// Get a transaction header by ID.
pub async fn get_transaction_by_id(
    pool: &Pool,
    id: i64,
) -> Result<Option<Transaction>, DatabaseError> {
    debug!("Fetching transaction: {}", id);

    let client = checkout(pool).await?;

    let row = client
        .query_opt(
            r#"
            SELECT id, customer_id, total_cost_in_points
            FROM transactions
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    row.as_ref().map(row_to_transaction).transpose()
}

/// Get the voucher links of a transaction.
pub async fn get_transaction_vouchers(
    pool: &Pool,
    transaction_id: i64,
) -> Result<Vec<TransactionVoucher>, DatabaseError> {
    debug!("Fetching voucher links for transaction: {}", transaction_id);

    let client = checkout(pool).await?;

    let rows = client
        .query(
            r#"
            SELECT transaction_id, voucher_id
            FROM transaction_vouchers
            WHERE transaction_id = $1
            ORDER BY voucher_id ASC
            "#,
            &[&transaction_id],
        )
        .await?;

    rows.iter()
        .map(|row| -> Result<TransactionVoucher, DatabaseError> {
            Ok(TransactionVoucher {
                transaction_id: row.try_get("transaction_id")?,
                voucher_id: row.try_get("voucher_id")?,
            })
        })
        .collect()
}
