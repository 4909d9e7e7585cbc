use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/businesses/:business_id/providers/:provider_id/slots",
        get(handlers::slots::list_available_slots),
    )
}
