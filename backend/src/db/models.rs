//! # Database Models
//!
//! This module defines the data structures that map to database tables.
//! Each struct represents a row in a table.
//!
//! ## Table Overview
//!
//! | Table | Description |
//! |-------|-------------|
//! | `brands` | Voucher-issuing brands |
//! | `vouchers` | Point-priced vouchers, each owned by a brand |
//! | `transactions` | One row per redemption |
//! | `transaction_vouchers` | Vouchers redeemed in a transaction |
//!
//! ## Relationship Diagram
//!
//! ```text
//! ┌─────────────┐       ┌──────────────────┐
//! │   brands    │──────<│     vouchers     │
//! │             │       │                  │
//! │ id (PK)     │       │ brand_id (FK)    │
//! │ name        │       │ cost_in_points   │
//! │ description │       │ voucher_code     │
//! └─────────────┘       └──────────────────┘
//!                                ^
//!                                │
//! ┌──────────────────┐   ┌───────┴──────────────┐
//! │   transactions   │──<│ transaction_vouchers │
//! │                  │   │                      │
//! │ id (PK)          │   │ transaction_id (FK)  │
//! │ customer_id      │   │ voucher_id (FK)      │
//! │ total_cost       │   └──────────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Note on Types
//!
//! IDs are `i64` to match PostgreSQL `BIGSERIAL`. Point amounts are `f64`
//! (`DOUBLE PRECISION`).

use serde::{Deserialize, Serialize};

/// A brand that issues vouchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    /// Assigned by the store.
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// A redeemable voucher owned by a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    /// Assigned by the store.
    pub id: i64,

    /// Owning brand. The storage layer rejects IDs with no brand row.
    pub brand_id: i64,

    /// Price of the voucher in loyalty points.
    pub cost_in_points: f64,

    /// Human-facing code. Not required to be unique.
    pub voucher_code: String,
}

/// The header row of a redemption.
///
/// `total_cost_in_points` is whatever the caller sent; it is not derived
/// from the costs of the linked vouchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store.
    pub id: i64,
    pub customer_id: i64,
    pub total_cost_in_points: f64,
}

/// Link row pairing a transaction with one redeemed voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionVoucher {
    pub transaction_id: i64,
    pub voucher_id: i64,
}
