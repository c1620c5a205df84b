//! # Voucher Redemption Backend Service
//!
//! REST service for a loyalty-voucher program:
//!
//! - Register brands and issue point-priced vouchers
//! - Redeem several vouchers in one atomic transaction
//! - Look redemptions up again by ID
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  REST API (Actix)                                          │  │
//! │  │  /brand  /voucher  /voucher/brand  /transaction/redemption │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                           │  │
//! │  │                    VoucherService                          │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │  VoucherStore: PostgresStore (redemption engine)           │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │                   ┌──────┴──────┐                                │
//! │                   │  PostgreSQL │                                │
//! │                   └─────────────┘                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Set up PostgreSQL and create the database
//! 2. Put `DATABASE_URL` (and optionally `PORT`) in `.env`
//! 3. Start the server: `cargo run` (the schema is created on startup)
//!
//! `STORE_BACKEND=memory cargo run` starts without a database.

use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod db;
mod models;
mod services;

use config::{AppConfig, StoreBackend};
use db::{Database, MemoryStore, PostgresStore, VoucherStore};
use services::VoucherService;

/// Application state shared across all handlers.
pub struct AppState {
    /// Brand, voucher and redemption operations
    pub voucher_service: VoucherService,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Loads configuration from environment
/// 2. Initializes the store (database connection and schema)
/// 3. Builds the voucher service
/// 4. Launches the HTTP server
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // =========================================
    // STEP 1: Load Configuration
    // =========================================
    // Loaded first so RUST_LOG from .env reaches the subscriber
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    // =========================================
    // STEP 2: Initialize Logging
    // =========================================
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Voucher Redemption Backend Service");

    let config = AppConfig::from_env().expect("Failed to load configuration");

    info!("📋 Configuration loaded");

    // =========================================
    // STEP 3: Initialize Store
    // =========================================
    let store: Arc<dyn VoucherStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL is required for the postgres backend");

            let db = Database::connect(database_url, config.database_max_connections)
                .await
                .expect("Failed to connect to database");

            info!("🗄️  Database connected");

            db.run_migrations()
                .await
                .expect("Failed to run migrations");

            info!("📦 Database migrations complete");

            Arc::new(PostgresStore::new(db))
        }
        StoreBackend::Memory => {
            warn!("⚠️  Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    // =========================================
    // STEP 4: Initialize Services
    // =========================================
    let voucher_service = VoucherService::new(store);

    let app_state = Arc::new(AppState { voucher_service });

    info!("🔧 Services initialized");

    // =========================================
    // STEP 5: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("🌐 Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))
            // Add logging middleware
            .wrap(middleware::Logger::default())
            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind((server_host.as_str(), server_port))?
    .run()
    .await
}
