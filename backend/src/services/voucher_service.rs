//! # Voucher Service
//!
//! Entry point for every brand, voucher and redemption operation the API
//! exposes. It owns no state of its own: each call is forwarded to the
//! configured `VoucherStore`, so the same service runs against PostgreSQL in
//! production and `MemoryStore` in tests.
//!
//! ## Flow Example: Redemption
//!
//! ```text
//! 1. POST /transaction/redemption
//!                ↓
//! 2. VoucherService::make_redemption()
//!                ↓
//! 3. VoucherStore::make_redemption()  (one atomic unit of work)
//!                ↓
//! 4. Transaction returned, or nothing persisted
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::{Brand, DatabaseError, Transaction, TransactionVoucher, Voucher, VoucherStore};

/// Application service over a `VoucherStore`.
///
/// ## Usage
///
/// ```rust,ignore
/// let service = VoucherService::new(Arc::new(PostgresStore::new(db)));
/// let brand = service.create_brand("Acme", "Rockets and anvils").await?;
/// ```
#[derive(Clone)]
pub struct VoucherService {
    store: Arc<dyn VoucherStore>,
}

impl VoucherService {
    pub fn new(store: Arc<dyn VoucherStore>) -> Self {
        Self { store }
    }

    pub async fn create_brand(&self, name: &str, description: &str) -> Result<Brand, DatabaseError> {
        debug!("create_brand: {}", name);
        self.store.create_brand(name, description).await
    }

    pub async fn create_voucher(
        &self,
        brand_id: i64,
        cost_in_points: f64,
        voucher_code: &str,
    ) -> Result<Voucher, DatabaseError> {
        debug!("create_voucher: brand {} code {}", brand_id, voucher_code);
        self.store
            .create_voucher(brand_id, cost_in_points, voucher_code)
            .await
    }

    pub async fn get_voucher_by_id(&self, id: i64) -> Result<Voucher, DatabaseError> {
        self.store.get_voucher_by_id(id).await
    }

    pub async fn get_vouchers_by_brand(&self, brand_id: i64) -> Result<Vec<Voucher>, DatabaseError> {
        self.store.get_vouchers_by_brand(brand_id).await
    }

    /// Redeem `voucher_ids` for a customer.
    ///
    /// `total_cost_in_points` is trusted as sent. It is not compared with the
    /// vouchers' own costs.
    pub async fn make_redemption(
        &self,
        customer_id: i64,
        voucher_ids: &[i64],
        total_cost_in_points: f64,
    ) -> Result<Transaction, DatabaseError> {
        if voucher_ids.is_empty() {
            warn!("Customer {} redeemed an empty voucher list", customer_id);
        }
        self.store
            .make_redemption(customer_id, voucher_ids, total_cost_in_points)
            .await
    }

    pub async fn get_transaction_detail(
        &self,
        transaction_id: i64,
    ) -> Result<Transaction, DatabaseError> {
        self.store.get_transaction_detail(transaction_id).await
    }

    pub async fn get_transaction_vouchers(
        &self,
        transaction_id: i64,
    ) -> Result<Vec<TransactionVoucher>, DatabaseError> {
        self.store.get_transaction_vouchers(transaction_id).await
    }

    /// True when the store answers.
    pub async fn is_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Store health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn service() -> VoucherService {
        VoucherService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_end_to_end_redemption() {
        let service = service();

        let brand = service.create_brand("Acme", "desc").await.unwrap();
        assert_eq!(brand.id, 1);

        let v1 = service.create_voucher(brand.id, 50.0, "V1").await.unwrap();
        let v2 = service.create_voucher(brand.id, 75.0, "V2").await.unwrap();
        assert_eq!((v1.id, v2.id), (1, 2));

        let tx = service
            .make_redemption(42, &[v1.id, v2.id], 125.0)
            .await
            .unwrap();
        assert_eq!(tx.id, 1);
        assert_eq!(tx.customer_id, 42);
        assert_eq!(tx.total_cost_in_points, 125.0);

        let links = service.get_transaction_vouchers(tx.id).await.unwrap();
        assert_eq!(
            links,
            vec![
                TransactionVoucher { transaction_id: 1, voucher_id: 1 },
                TransactionVoucher { transaction_id: 1, voucher_id: 2 },
            ]
        );
        assert_eq!(service.get_transaction_detail(tx.id).await.unwrap(), tx);
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let service = service();

        assert!(service.get_voucher_by_id(1).await.unwrap_err().is_not_found());
        assert!(service.get_transaction_detail(1).await.unwrap_err().is_not_found());
        assert!(matches!(
            service.create_voucher(1, 10.0, "X").await.unwrap_err(),
            DatabaseError::ConstraintViolation(_)
        ));
        assert!(matches!(
            service.make_redemption(1, &[1], 10.0).await.unwrap_err(),
            DatabaseError::RedemptionFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        assert!(service().is_healthy().await);
    }
}
