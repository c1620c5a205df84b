//! # Redemption Engine
//!
//! Writes one `transactions` header and one `transaction_vouchers` row per
//! redeemed voucher inside a single database transaction.
//!
//! ## Flow
//!
//! ```text
//! 1. Check out a connection, BEGIN
//!                ↓
//! 2. INSERT header ... RETURNING id
//!                ↓
//! 3. INSERT one link row per voucher ID (input order, duplicates kept)
//!                ↓
//! 4. COMMIT  ──── any failure in 2-4 ───→  ROLLBACK, return the failing step
//! ```
//!
//! The tokio-postgres `Transaction` rolls back when dropped uncommitted, so
//! an early return or a panic between BEGIN and COMMIT leaves nothing behind.

use deadpool_postgres::Pool;
use tracing::{debug, error, info, warn};

use super::models::Transaction;
use super::queries::{checkout, row_to_transaction};
use super::{DatabaseError, RedemptionStep};

fn failed(step: RedemptionStep, source: DatabaseError) -> DatabaseError {
    DatabaseError::RedemptionFailed {
        step,
        source: Box::new(source),
    }
}

/// Record a redemption atomically.
///
/// `total_cost_in_points` is stored as given. Voucher IDs are not checked
/// up front; the foreign key on `transaction_vouchers.voucher_id` rejects
/// unknown ones and the whole redemption is rolled back.
pub async fn make_redemption(
    pool: &Pool,
    customer_id: i64,
    voucher_ids: &[i64],
    total_cost_in_points: f64,
) -> Result<Transaction, DatabaseError> {
    debug!(
        "Redeeming {} voucher(s) for customer {}",
        voucher_ids.len(),
        customer_id
    );

    let mut client = checkout(pool)
        .await
        .map_err(|e| failed(RedemptionStep::Begin, e))?;

    let tx = client
        .transaction()
        .await
        .map_err(|e| failed(RedemptionStep::Begin, DatabaseError::from(e)))?;

    match insert_rows(&tx, customer_id, voucher_ids, total_cost_in_points).await {
        Ok(transaction) => {
            tx.commit()
                .await
                .map_err(|e| failed(RedemptionStep::Commit, DatabaseError::from_query(e)))?;

            info!(
                "Redemption {} committed: customer {}, {} voucher(s), {} points",
                transaction.id,
                transaction.customer_id,
                voucher_ids.len(),
                transaction.total_cost_in_points
            );
            Ok(transaction)
        }
        Err(e) => {
            error!("Redemption for customer {} aborted: {}", customer_id, e);
            if let Err(rollback_err) = tx.rollback().await {
                // The server discards the open transaction when the session resets.
                warn!("Explicit rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn insert_rows(
    tx: &tokio_postgres::Transaction<'_>,
    customer_id: i64,
    voucher_ids: &[i64],
    total_cost_in_points: f64,
) -> Result<Transaction, DatabaseError> {
    let row = tx
        .query_one(
            r#"
            INSERT INTO transactions (customer_id, total_cost_in_points)
            VALUES ($1, $2)
            RETURNING id, customer_id, total_cost_in_points
            "#,
            &[&customer_id, &total_cost_in_points],
        )
        .await
        .map_err(|e| failed(RedemptionStep::InsertHeader, DatabaseError::from_query(e)))?;

    let transaction =
        row_to_transaction(&row).map_err(|e| failed(RedemptionStep::InsertHeader, e))?;

    for &voucher_id in voucher_ids {
        tx.execute(
            r#"
            INSERT INTO transaction_vouchers (transaction_id, voucher_id)
            VALUES ($1, $2)
            "#,
            &[&transaction.id, &voucher_id],
        )
        .await
        .map_err(|e| {
            failed(
                RedemptionStep::LinkVoucher(voucher_id),
                DatabaseError::from_query(e),
            )
        })?;
    }

    Ok(transaction)
}
