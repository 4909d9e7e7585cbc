use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::{
    errors::BookingError,
    models::booking::{
        BookingResponse, BookingStatus, CancelBookingRequest, CancelBookingResponse,
        CreateBookingRequest, LineItemResponse, RescheduleBookingRequest,
        RescheduleBookingResponse,
    },
};
use slotbook_db::models::{DbBooking, DbBookingLineItem};
use slotbook_db::repositories::booking::{self, NewBooking};

use crate::{middleware::error_handling::AppError, notify, ApiState};

/// Parses a boundary instant. RFC 3339 requires an explicit offset or "Z";
/// anything else (including a naive local date-time) is a validation error
/// before any datastore access.
fn parse_instant(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError(BookingError::Validation(format!(
                "{field} must be an RFC 3339 date-time with an explicit offset"
            )))
        })
}

fn booking_response(
    booking: DbBooking,
    line_items: Vec<DbBookingLineItem>,
) -> Result<BookingResponse, AppError> {
    let status = BookingStatus::from_str(&booking.status)
        .map_err(|msg| AppError(BookingError::Internal(msg.into())))?;

    Ok(BookingResponse {
        id: booking.id,
        business_id: booking.business_id,
        customer_id: booking.customer_id,
        scheduled_start: booking.scheduled_start,
        scheduled_end: booking.scheduled_end,
        status,
        notes: booking.notes,
        line_items: line_items
            .into_iter()
            .map(|li| LineItemResponse {
                provider_id: li.provider_id,
                service_id: li.service_id,
                price_cents: li.price_cents,
                duration_minutes: li.duration_minutes,
            })
            .collect(),
    })
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let start = parse_instant(&payload.start, "start")?;
    let now = state.clock.now();

    let (booking, line_items) = booking::create_booking(
        &state.db_pool,
        now,
        NewBooking {
            business_id: payload.business_id,
            customer_id: payload.customer_id,
            provider_ids: &payload.provider_ids,
            service_ids: &payload.service_ids,
            start,
            notes: payload.notes.as_deref(),
        },
    )
    .await?;

    Ok(Json(booking_response(booking, line_items)?))
}

#[axum::debug_handler]
pub async fn reschedule_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<Json<RescheduleBookingResponse>, AppError> {
    let new_start = parse_instant(&payload.new_start, "new_start")?;
    let now = state.clock.now();

    let outcome = booking::reschedule_booking(
        &state.db_pool,
        now,
        booking_id,
        payload.customer_id,
        new_start,
    )
    .await?;

    // Post-commit, fire-and-forget; must not block or fail the reschedule.
    notify::spawn_rescheduled(
        state.notifier.clone(),
        outcome.old_booking_id,
        outcome.new_booking_id,
    );

    Ok(Json(RescheduleBookingResponse {
        old_booking_id: outcome.old_booking_id,
        new_booking_id: outcome.new_booking_id,
    }))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let now = state.clock.now();

    let outcome = booking::cancel_booking(
        &state.db_pool,
        now,
        booking_id,
        payload.actor_id,
        payload.actor_role,
    )
    .await?;

    // Post-commit, fire-and-forget; must not block or fail the cancellation.
    notify::spawn_canceled(state.notifier.clone(), booking_id);

    Ok(Json(CancelBookingResponse {
        previous_status: outcome.previous_status,
        new_status: outcome.new_status,
        timestamp: outcome.timestamp,
    }))
}
