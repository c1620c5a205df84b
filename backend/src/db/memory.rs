//! # In-Memory Store
//!
//! A `VoucherStore` that keeps all tables in process. It enforces the same
//! constraints the PostgreSQL schema does (voucher -> brand and
//! link -> voucher foreign keys) so tests observe the same failures.
//!
//! Redemptions are staged in a `PendingRedemption` and only published to the
//! tables by `commit`. Dropping a pending redemption discards it, which is
//! the rollback.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::models::*;
use super::store::VoucherStore;
use super::{DatabaseError, RedemptionStep};

#[derive(Default)]
struct Tables {
    brands: BTreeMap<i64, Brand>,
    vouchers: BTreeMap<i64, Voucher>,
    transactions: BTreeMap<i64, Transaction>,
    transaction_vouchers: Vec<TransactionVoucher>,

    // Sequences. Like BIGSERIAL, a value handed out is never reused, even
    // when the insert that took it is rolled back.
    last_brand_id: i64,
    last_voucher_id: i64,
    last_transaction_id: i64,
}

impl Tables {
    fn next_brand_id(&mut self) -> i64 {
        self.last_brand_id += 1;
        self.last_brand_id
    }

    fn next_voucher_id(&mut self) -> i64 {
        self.last_voucher_id += 1;
        self.last_voucher_id
    }

    fn next_transaction_id(&mut self) -> i64 {
        self.last_transaction_id += 1;
        self.last_transaction_id
    }
}

/// Rows written by a redemption that is not yet visible.
struct PendingRedemption {
    header: Transaction,
    links: Vec<TransactionVoucher>,
}

impl PendingRedemption {
    fn commit(self, tables: &mut Tables) -> Transaction {
        tables.transaction_vouchers.extend(self.links);
        tables
            .transactions
            .insert(self.header.id, self.header.clone());
        self.header
    }
}

/// `VoucherStore` held entirely in memory.
///
/// One mutex guards every table; a redemption holds it from the first
/// insert to the commit.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed transaction headers.
    #[cfg(test)]
    pub async fn transaction_count(&self) -> usize {
        self.tables.lock().await.transactions.len()
    }

    /// Number of committed link rows across all transactions.
    #[cfg(test)]
    pub async fn transaction_voucher_count(&self) -> usize {
        self.tables.lock().await.transaction_vouchers.len()
    }
}

#[async_trait]
impl VoucherStore for MemoryStore {
    async fn create_brand(&self, name: &str, description: &str) -> Result<Brand, DatabaseError> {
        let mut tables = self.tables.lock().await;

        let brand = Brand {
            id: tables.next_brand_id(),
            name: name.to_string(),
            description: description.to_string(),
        };
        tables.brands.insert(brand.id, brand.clone());

        info!("Brand created: {} ({})", brand.id, brand.name);
        Ok(brand)
    }

    async fn create_voucher(
        &self,
        brand_id: i64,
        cost_in_points: f64,
        voucher_code: &str,
    ) -> Result<Voucher, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if !tables.brands.contains_key(&brand_id) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "vouchers.brand_id {} does not reference a brand",
                brand_id
            )));
        }

        let voucher = Voucher {
            id: tables.next_voucher_id(),
            brand_id,
            cost_in_points,
            voucher_code: voucher_code.to_string(),
        };
        tables.vouchers.insert(voucher.id, voucher.clone());

        info!("Voucher created: {} (brand {})", voucher.id, voucher.brand_id);
        Ok(voucher)
    }

    async fn get_voucher_by_id(&self, id: i64) -> Result<Voucher, DatabaseError> {
        debug!("Fetching voucher: {}", id);
        self.tables
            .lock()
            .await
            .vouchers
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("voucher {}", id)))
    }

    async fn get_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>, DatabaseError> {
        debug!("Fetching vouchers for brand: {}", brand_id);
        Ok(self
            .tables
            .lock()
            .await
            .vouchers
            .values()
            .filter(|voucher| voucher.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn make_redemption(
        &self,
        customer_id: i64,
        voucher_ids: &[i64],
        total_cost_in_points: f64,
    ) -> Result<Transaction, DatabaseError> {
        let mut tables = self.tables.lock().await;

        let mut pending = PendingRedemption {
            header: Transaction {
                id: tables.next_transaction_id(),
                customer_id,
                total_cost_in_points,
            },
            links: Vec::with_capacity(voucher_ids.len()),
        };

        for &voucher_id in voucher_ids {
            if !tables.vouchers.contains_key(&voucher_id) {
                error!(
                    "Redemption {} for customer {} aborted at voucher {}",
                    pending.header.id, customer_id, voucher_id
                );
                return Err(DatabaseError::RedemptionFailed {
                    step: RedemptionStep::LinkVoucher(voucher_id),
                    source: Box::new(DatabaseError::ConstraintViolation(format!(
                        "transaction_vouchers.voucher_id {} does not reference a voucher",
                        voucher_id
                    ))),
                });
            }

            pending.links.push(TransactionVoucher {
                transaction_id: pending.header.id,
                voucher_id,
            });
        }

        let transaction = pending.commit(&mut tables);
        info!(
            "Redemption {} committed: customer {}, {} voucher(s), {} points",
            transaction.id,
            transaction.customer_id,
            voucher_ids.len(),
            transaction.total_cost_in_points
        );
        Ok(transaction)
    }

    async fn get_transaction_detail(
        &self,
        transaction_id: i64,
    ) -> Result<Transaction, DatabaseError> {
        debug!("Fetching transaction: {}", transaction_id);
        self.tables
            .lock()
            .await
            .transactions
            .get(&transaction_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("transaction {}", transaction_id)))
    }

    async fn get_transaction_vouchers(
        &self,
        transaction_id: i64,
    ) -> Result<Vec<TransactionVoucher>, DatabaseError> {
        let mut links: Vec<TransactionVoucher> = self
            .tables
            .lock()
            .await
            .transaction_vouchers
            .iter()
            .filter(|link| link.transaction_id == transaction_id)
            .copied()
            .collect();
        links.sort_by_key(|link| link.voucher_id);
        Ok(links)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
