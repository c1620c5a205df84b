//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Validates input
//! 3. Calls the voucher service
//! 4. Returns the entity, or an error envelope
//!
//! ## Error Handling
//!
//! | Failure | Status | Code |
//! |---------|--------|------|
//! | Body does not decode | 400 | `INVALID_REQUEST_BODY` |
//! | Query parameter absent or empty | 400 | `MISSING_PARAMETER` |
//! | Query parameter not an integer | 400 | `INVALID_PARAMETER` |
//! | Negative or non-finite voucher cost | 400 | `INVALID_COST` |
//! | Record not found | 500 | `NOT_FOUND` |
//! | Any other store failure | 500 | `STORAGE_ERROR` |
//!
//! Not-found is a 500; the API does not distinguish it from
//! other store failures.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::{error, info};

use crate::db::DatabaseError;
use crate::models::{
    ApiResponse, CreateBrandRequest, CreateVoucherRequest, HealthResponse, IdQuery,
    RedemptionRequest, TransactionIdQuery,
};
use crate::AppState;

/// Parse a required integer query parameter.
fn require_id(raw: Option<&str>, label: &str) -> Result<i64, HttpResponse> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty()).ok_or_else(|| {
        HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "MISSING_PARAMETER",
            &format!("{} is required", label),
        ))
    })?;

    raw.parse::<i64>().map_err(|_| {
        HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "INVALID_PARAMETER",
            &format!("{} must be an integer, got '{}'", label, raw),
        ))
    })
}

/// Map a store failure to a 500 with a readable message.
fn store_failure(context: &str, e: &DatabaseError) -> HttpResponse {
    error!("{}: {}", context, e);

    let code = if e.is_not_found() {
        "NOT_FOUND"
    } else {
        "STORAGE_ERROR"
    };

    HttpResponse::InternalServerError()
        .json(ApiResponse::<()>::error(code, &format!("{}: {}", context, e)))
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Response
///
/// ```json
/// {
///     "success": true,
///     "data": {
///         "status": "healthy",
///         "database": true,
///         "version": "0.1.0",
///         "timestamp": "2026-10-17T12:00:00Z"
///     }
/// }
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let db_healthy = state.voucher_service.is_healthy().await;

    let response = HealthResponse {
        status: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: db_healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    let status_code = if db_healthy {
        actix_web::http::StatusCode::OK
    } else {
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    };

    HttpResponse::build(status_code).json(ApiResponse::success(response))
}

/// Register a brand.
///
/// ## Endpoint
///
/// `POST /brand`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/brand \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Acme", "description": "Rockets and anvils"}'
/// ```
///
/// **Response (201):**
/// ```json
/// { "id": 1, "name": "Acme", "description": "Rockets and anvils" }
/// ```
pub async fn create_brand(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CreateBrandRequest>,
) -> HttpResponse {
    info!("Create brand request: {}", body.name);

    match state
        .voucher_service
        .create_brand(&body.name, &body.description)
        .await
    {
        Ok(brand) => HttpResponse::Created().json(brand),
        Err(e) => store_failure("Error creating brand", &e),
    }
}

/// Issue a voucher for a brand.
///
/// ## Endpoint
///
/// `POST /voucher`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/voucher \
///   -H "Content-Type: application/json" \
///   -d '{"brand_id": 1, "cost_in_points": 100.0, "voucher_code": "TESTCODE"}'
/// ```
///
/// **Response (201):**
/// ```json
/// { "id": 1, "brand_id": 1, "cost_in_points": 100.0, "voucher_code": "TESTCODE" }
/// ```
///
/// ## Errors
///
/// - `INVALID_COST` - Cost is negative, NaN or infinite
/// - `STORAGE_ERROR` - Unknown brand, or the database failed
pub async fn create_voucher(
    state: web::Data<Arc<AppState>>,
    body: web::Json<CreateVoucherRequest>,
) -> HttpResponse {
    info!(
        "Create voucher request: {} for brand {} ({} points)",
        body.voucher_code, body.brand_id, body.cost_in_points
    );

    if !body.cost_in_points.is_finite() || body.cost_in_points < 0.0 {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "INVALID_COST",
            "cost_in_points must be a finite, non-negative number",
        ));
    }

    match state
        .voucher_service
        .create_voucher(body.brand_id, body.cost_in_points, &body.voucher_code)
        .await
    {
        Ok(voucher) => HttpResponse::Created().json(voucher),
        Err(e) => store_failure("Error creating voucher", &e),
    }
}

/// Get a voucher by ID.
///
/// ## Endpoint
///
/// `GET /voucher?id=1`
pub async fn get_voucher(
    state: web::Data<Arc<AppState>>,
    query: web::Query<IdQuery>,
) -> HttpResponse {
    let id = match require_id(query.id.as_deref(), "Voucher ID") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.voucher_service.get_voucher_by_id(id).await {
        Ok(voucher) => HttpResponse::Ok().json(voucher),
        Err(e) => store_failure("Error fetching voucher", &e),
    }
}

/// List the vouchers of a brand.
///
/// ## Endpoint
///
/// `GET /voucher/brand?id=1`
///
/// A brand without vouchers yields `[]`.
pub async fn get_vouchers_by_brand(
    state: web::Data<Arc<AppState>>,
    query: web::Query<IdQuery>,
) -> HttpResponse {
    let brand_id = match require_id(query.id.as_deref(), "Brand ID") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.voucher_service.get_vouchers_by_brand(brand_id).await {
        Ok(vouchers) => HttpResponse::Ok().json(vouchers),
        Err(e) => store_failure("Error fetching vouchers", &e),
    }
}

/// Redeem vouchers.
///
/// ## Endpoint
///
/// `POST /transaction/redemption`
///
/// ## Example
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/transaction/redemption \
///   -H "Content-Type: application/json" \
///   -d '{"customer_id": 42, "voucher_ids": [1, 2], "total_cost_in_points": 125.0}'
/// ```
///
/// **Response (201):**
/// ```json
/// { "id": 1, "customer_id": 42, "total_cost_in_points": 125.0 }
/// ```
///
/// Either the transaction and all of its voucher links are stored, or
/// nothing is.
pub async fn make_redemption(
    state: web::Data<Arc<AppState>>,
    body: web::Json<RedemptionRequest>,
) -> HttpResponse {
    info!(
        "Redemption request: customer {} redeeming {:?} for {} points",
        body.customer_id, body.voucher_ids, body.total_cost_in_points
    );

    match state
        .voucher_service
        .make_redemption(body.customer_id, &body.voucher_ids, body.total_cost_in_points)
        .await
    {
        Ok(transaction) => HttpResponse::Created().json(transaction),
        Err(e) => store_failure("Error processing redemption", &e),
    }
}

/// Get a redemption's transaction header.
///
/// ## Endpoint
///
/// `GET /transaction/redemption?transactionId=1`
pub async fn get_transaction_detail(
    state: web::Data<Arc<AppState>>,
    query: web::Query<TransactionIdQuery>,
) -> HttpResponse {
    let transaction_id = match require_id(query.transaction_id.as_deref(), "Transaction ID") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .voucher_service
        .get_transaction_detail(transaction_id)
        .await
    {
        Ok(transaction) => HttpResponse::Ok().json(transaction),
        Err(e) => store_failure("Error fetching transaction detail", &e),
    }
}

/// Get the voucher links of a redemption.
///
/// ## Endpoint
///
/// `GET /transaction/redemption/vouchers?transactionId=1`
///
/// **Response (200):**
/// ```json
/// [
///     { "transaction_id": 1, "voucher_id": 1 },
///     { "transaction_id": 1, "voucher_id": 2 }
/// ]
/// ```
pub async fn get_transaction_vouchers(
    state: web::Data<Arc<AppState>>,
    query: web::Query<TransactionIdQuery>,
) -> HttpResponse {
    let transaction_id = match require_id(query.transaction_id.as_deref(), "Transaction ID") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state
        .voucher_service
        .get_transaction_vouchers(transaction_id)
        .await
    {
        Ok(links) => HttpResponse::Ok().json(links),
        Err(e) => store_failure("Error fetching transaction vouchers", &e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::api::configure_routes;
    use crate::db::MemoryStore;
    use crate::services::VoucherService;

    fn state() -> web::Data<Arc<AppState>> {
        web::Data::new(Arc::new(AppState {
            voucher_service: VoucherService::new(Arc::new(MemoryStore::new())),
        }))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure_routes)).await
        };
    }

    fn error_code(body: &Value) -> &str {
        body["error"]["code"].as_str().unwrap_or_default()
    }

    #[actix_web::test]
    async fn test_create_brand() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/brand")
            .set_json(json!({ "name": "Test Brand", "description": "Test Description" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "id": 1, "name": "Test Brand", "description": "Test Description" })
        );
    }

    #[actix_web::test]
    async fn test_create_brand_malformed_body() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/brand")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"name\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "INVALID_REQUEST_BODY");
    }

    #[actix_web::test]
    async fn test_body_without_content_type_is_accepted() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/brand")
            .set_payload(r#"{"name": "Acme", "description": "desc"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_create_voucher_returns_full_record() {
        let state = state();
        state
            .voucher_service
            .create_brand("Acme", "desc")
            .await
            .unwrap();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/voucher")
            .set_json(json!({ "brand_id": 1, "cost_in_points": 100.0, "voucher_code": "TESTCODE" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "id": 1, "brand_id": 1, "cost_in_points": 100.0, "voucher_code": "TESTCODE" })
        );

        let req = test::TestRequest::get().uri("/voucher?id=1").to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, body);
    }

    #[actix_web::test]
    async fn test_create_voucher_negative_cost() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/voucher")
            .set_json(json!({ "brand_id": 1, "cost_in_points": -1.0, "voucher_code": "NEG" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "INVALID_COST");
    }

    #[actix_web::test]
    async fn test_create_voucher_unknown_brand() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/voucher")
            .set_json(json!({ "brand_id": 7, "cost_in_points": 1.0, "voucher_code": "X" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "STORAGE_ERROR");
    }

    #[actix_web::test]
    async fn test_get_voucher_query_validation() {
        let state = state();
        let app = app!(state);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/voucher").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "MISSING_PARAMETER");

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/voucher?id=").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/voucher?id=abc").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "INVALID_PARAMETER");
    }

    #[actix_web::test]
    async fn test_get_voucher_not_found_is_server_error() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/voucher?id=1").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_get_vouchers_by_brand() {
        let state = state();
        let service = &state.voucher_service;
        service.create_brand("Acme", "desc").await.unwrap();
        service.create_brand("Empty", "desc").await.unwrap();
        service.create_voucher(1, 50.0, "V1").await.unwrap();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/voucher/brand?id=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!([{ "id": 1, "brand_id": 1, "cost_in_points": 50.0, "voucher_code": "V1" }])
        );

        let req = test::TestRequest::get().uri("/voucher/brand?id=2").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]));

        let req = test::TestRequest::get().uri("/voucher/brand").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_redemption_flow() {
        let state = state();
        let service = &state.voucher_service;
        service.create_brand("Acme", "desc").await.unwrap();
        service.create_voucher(1, 50.0, "V1").await.unwrap();
        service.create_voucher(1, 75.0, "V2").await.unwrap();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/transaction/redemption")
            .set_json(json!({ "customer_id": 42, "voucher_ids": [1, 2], "total_cost_in_points": 125.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(
            created,
            json!({ "id": 1, "customer_id": 42, "total_cost_in_points": 125.0 })
        );

        let req = test::TestRequest::get()
            .uri("/transaction/redemption?transactionId=1")
            .to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        let req = test::TestRequest::get()
            .uri("/transaction/redemption/vouchers?transactionId=1")
            .to_request();
        let links: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            links,
            json!([
                { "transaction_id": 1, "voucher_id": 1 },
                { "transaction_id": 1, "voucher_id": 2 }
            ])
        );
    }

    #[actix_web::test]
    async fn test_redemption_without_voucher_ids() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/transaction/redemption")
            .set_json(json!({ "customer_id": 1, "total_cost_in_points": 0.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_failed_redemption_leaves_nothing() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/transaction/redemption")
            .set_json(json!({ "customer_id": 1, "voucher_ids": [5], "total_cost_in_points": 10.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "STORAGE_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("link voucher 5"));

        let req = test::TestRequest::get()
            .uri("/transaction/redemption?transactionId=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_transaction_detail_requires_id() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/transaction/redemption?id=1")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(error_code(&body), "MISSING_PARAMETER");
    }

    #[actix_web::test]
    async fn test_health_check() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["status"], json!("healthy"));
        assert_eq!(body["data"]["database"], json!(true));
    }
}
