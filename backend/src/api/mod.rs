//! # REST API Module
//!
//! This module defines all HTTP endpoints for the voucher API.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/brand` | Register a brand |
//! | POST | `/voucher` | Issue a voucher |
//! | GET | `/voucher?id=` | Voucher by ID |
//! | GET | `/voucher/brand?id=` | Vouchers of a brand |
//! | POST | `/transaction/redemption` | Redeem vouchers |
//! | GET | `/transaction/redemption?transactionId=` | Redemption header |
//! | GET | `/transaction/redemption/vouchers?transactionId=` | Redeemed voucher links |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! Requests and successful responses are plain JSON entities with
//! snake_case fields. Failures use the error envelope:
//!
//! ```json
//! {
//!     "success": false,
//!     "data": null,
//!     "error": {
//!         "code": "ERROR_CODE",
//!         "message": "Human readable message"
//!     }
//! }
//! ```

pub mod handlers;
pub mod routes;

pub use routes::configure_routes;
