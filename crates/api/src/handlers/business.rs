use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::{
    errors::BookingError,
    models::provider::{
        Business, CreateBusinessRequest, CreateServiceRequest, Service,
        SetBusinessHoursResponse, SetWindowsRequest,
    },
    schedule,
};
use slotbook_db::repositories::{business, service};

use crate::{middleware::error_handling::AppError, ApiState};

use super::provider::windows_from_request;

#[axum::debug_handler]
pub async fn create_business(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBusinessRequest>,
) -> Result<Json<Business>, AppError> {
    // Reject unknown zones here so every later resolve can trust the column.
    schedule::parse_zone(&payload.timezone)
        .map_err(|e| AppError(BookingError::Validation(e.to_string())))?;

    let biz = business::create_business(&state.db_pool, &payload.name, &payload.timezone)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(Business {
        id: biz.id,
        name: biz.name,
        timezone: biz.timezone,
        created_at: biz.created_at,
    }))
}

#[axum::debug_handler]
pub async fn set_business_hours(
    State(state): State<Arc<ApiState>>,
    Path(business_id): Path<Uuid>,
    Json(payload): Json<SetWindowsRequest>,
) -> Result<Json<SetBusinessHoursResponse>, AppError> {
    business::get_business_by_id(&state.db_pool, business_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Business {business_id} not found")))?;

    let windows = windows_from_request(&payload.windows)?;
    let rows: Vec<_> = windows
        .iter()
        .map(|w| (schedule::weekday_index(w.weekday), w.start, w.end))
        .collect();

    let window_count = business::replace_business_hours(&state.db_pool, business_id, &rows)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(SetBusinessHoursResponse {
        business_id,
        window_count,
        updated_at: Utc::now(),
    }))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    if payload.duration_minutes <= 0 {
        return Err(AppError(BookingError::Validation(
            "duration_minutes must be positive".to_string(),
        )));
    }
    if payload.price_cents < 0 {
        return Err(AppError(BookingError::Validation(
            "price_cents must not be negative".to_string(),
        )));
    }

    business::get_business_by_id(&state.db_pool, payload.business_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Business {} not found", payload.business_id))
        })?;

    let svc = service::create_service(
        &state.db_pool,
        payload.business_id,
        &payload.name,
        payload.price_cents,
        payload.duration_minutes,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(Service {
        id: svc.id,
        business_id: svc.business_id,
        name: svc.name,
        price_cents: svc.price_cents,
        duration_minutes: svc.duration_minutes,
    }))
}
