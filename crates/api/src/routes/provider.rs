use axum::{
    routing::{post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/providers", post(handlers::provider::create_provider))
        .route(
            "/api/providers/:id/availability",
            put(handlers::provider::set_availability),
        )
        .route(
            "/api/providers/:id/unavailability",
            put(handlers::provider::set_unavailability),
        )
}
