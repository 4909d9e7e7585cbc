//! # Slotbook API
//!
//! The API crate provides the web server implementation for the slotbook
//! booking engine. It exposes slot listings, booking creation, reschedule,
//! and cancellation, plus the reference-data endpoints that feed them.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error mapping and other cross-cutting concerns
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Fire-and-forget notification dispatch
pub mod notify;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use slotbook_core::clock::Clock;
use notify::Notifier;

/// Shared application state that is accessible to all request handlers.
///
/// The clock is injected rather than read ambiently so the same-day and
/// future-start rules stay deterministic in tests.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Source of "now" for all booking rules
    pub clock: Arc<dyn Clock>,
    /// Post-commit notification sink (never blocks a transaction)
    pub notifier: Arc<dyn Notifier>,
}

/// Starts the API server with the provided configuration and dependencies.
pub async fn start_server(
    config: config::ApiConfig,
    db_pool: PgPool,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        clock,
        notifier,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Business and service reference data
        .merge(routes::business::routes())
        // Provider and availability management
        .merge(routes::provider::routes())
        // Slot listings
        .merge(routes::slots::routes())
        // Booking engine endpoints
        .merge(routes::booking::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .map(|origin| origin.parse().unwrap())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware; a timed-out request drops its
    // transaction, which rolls it back in full.
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
