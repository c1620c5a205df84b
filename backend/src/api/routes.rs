//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::{error, web, HttpResponse};

use super::handlers;
use crate::models::ApiResponse;

/// Configure all API routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                        GET  - Health check
/// ├── /brand                         POST - Register brand
/// ├── /voucher                       POST - Issue voucher
/// │                                  GET  - Voucher by ?id=
/// ├── /voucher/brand                 GET  - Vouchers of brand ?id=
/// └── /transaction
///     ├── /redemption                POST - Redeem vouchers
///     │                              GET  - Transaction by ?transactionId=
///     └── /redemption/vouchers       GET  - Voucher links by ?transactionId=
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Malformed bodies get the same error envelope as every other failure
        .app_data(json_config())
        .route("/health", web::get().to(handlers::health_check))
        .route("/brand", web::post().to(handlers::create_brand))
        .service(
            web::resource("/voucher")
                .route(web::post().to(handlers::create_voucher))
                .route(web::get().to(handlers::get_voucher)),
        )
        .route("/voucher/brand", web::get().to(handlers::get_vouchers_by_brand))
        .service(
            web::scope("/transaction")
                .service(
                    web::resource("/redemption")
                        .route(web::post().to(handlers::make_redemption))
                        .route(web::get().to(handlers::get_transaction_detail)),
                )
                .route(
                    "/redemption/vouchers",
                    web::get().to(handlers::get_transaction_vouchers),
                ),
        );
}

/// JSON extractor settings: any content type is accepted, and decode
/// failures become a 400 `INVALID_REQUEST_BODY`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            let response =
                HttpResponse::BadRequest().json(ApiResponse::<()>::error("INVALID_REQUEST_BODY", &message));
            error::InternalError::from_response(err, response).into()
        })
}
