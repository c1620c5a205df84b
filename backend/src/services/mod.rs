//! # Services Module
//!
//! The application layer between the HTTP handlers and the store.
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `VoucherService` | Brands, vouchers, redemptions (delegates to a `VoucherStore`) |

pub mod voucher_service;

pub use voucher_service::VoucherService;
