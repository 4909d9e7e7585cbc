use axum::{
    routing::{post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/businesses", post(handlers::business::create_business))
        .route(
            "/api/businesses/:id/hours",
            put(handlers::business::set_business_hours),
        )
        .route("/api/services", post(handlers::business::create_service))
}
