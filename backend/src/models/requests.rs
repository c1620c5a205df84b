//! # API Request Models
//!
//! Structures for incoming API request bodies and query strings.
//! Field names are snake_case on the wire.

use serde::{Deserialize, Serialize};

/// Request to register a brand.
///
/// ## Example JSON
///
/// ```json
/// {
///     "name": "Acme",
///     "description": "Rockets and anvils"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
    pub description: String,
}

/// Request to issue a voucher for a brand.
///
/// ## Example JSON
///
/// ```json
/// {
///     "brand_id": 1,
///     "cost_in_points": 100.0,
///     "voucher_code": "TESTCODE"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVoucherRequest {
    /// Brand that owns the voucher. Must already exist.
    pub brand_id: i64,

    /// Price in loyalty points. Must be finite and not negative.
    pub cost_in_points: f64,

    pub voucher_code: String,
}

/// Request to redeem vouchers in one transaction.
///
/// ## Example JSON
///
/// ```json
/// {
///     "customer_id": 42,
///     "voucher_ids": [1, 2],
///     "total_cost_in_points": 125.0
/// }
/// ```
///
/// ## Notes
///
/// - `voucher_ids` may be empty or omitted; duplicates are kept
/// - `total_cost_in_points` is stored as sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub customer_id: i64,

    #[serde(default)]
    pub voucher_ids: Vec<i64>,

    pub total_cost_in_points: f64,
}

/// `?id=` query used by the voucher lookups.
///
/// Kept as a string so a missing value and a non-numeric value can be
/// reported separately.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `?transactionId=` query used by the redemption lookups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionIdQuery {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
}
