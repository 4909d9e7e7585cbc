//! Provider creation and the availability mutation edges.
//!
//! Containment rules are enforced here, at the edges that mutate the
//! recurring windows, not re-derived per booking: a provider's availability
//! must lie within the business's operating hours for the same weekday, and
//! unavailability must be a subset of some availability window. These are
//! wall-clock comparisons on weekly values; no calendar date is involved.

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
        CreateProviderRequest, Provider, SetWindowsRequest, SetWindowsResponse,
        WeeklyWindowRequest,
    },
    schedule::{self, WeeklyWindow},
};
use slotbook_db::models::DbWeeklyWindow;
use slotbook_db::repositories::{business, provider};

use crate::{middleware::error_handling::AppError, ApiState};

const DEFAULT_GRANULARITY_MINUTES: i32 = 30;

#[axum::debug_handler]
pub async fn create_provider(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateProviderRequest>,
) -> Result<Json<Provider>, AppError> {
    let granularity = payload
        .slot_granularity_minutes
        .unwrap_or(DEFAULT_GRANULARITY_MINUTES);
    if granularity <= 0 {
        return Err(AppError(BookingError::Validation(
            "slot_granularity_minutes must be positive".to_string(),
        )));
    }

    business::get_business_by_id(&state.db_pool, payload.business_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Business {} not found", payload.business_id))
        })?;

    let prov = provider::create_provider(
        &state.db_pool,
        payload.business_id,
        &payload.display_name,
        granularity,
    )
    .await
    .map_err(BookingError::Database)?;

    Ok(Json(Provider {
        id: prov.id,
        business_id: prov.business_id,
        display_name: prov.display_name,
        active: prov.active,
        slot_granularity_minutes: prov.slot_granularity_minutes,
        created_at: prov.created_at,
    }))
}

/// Replaces a provider's weekly availability windows. Each window must lie
/// within the business's operating hours for its weekday.
#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<SetWindowsRequest>,
) -> Result<Json<SetWindowsResponse>, AppError> {
    let prov = provider::get_provider_by_id(&state.db_pool, provider_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Provider {provider_id} not found")))?;

    let windows = windows_from_request(&payload.windows)?;

    for window in &windows {
        let weekday = schedule::weekday_index(window.weekday);
        let hours = business::get_business_hours(&state.db_pool, prov.business_id, weekday)
            .await
            .map_err(BookingError::Database)?;
        let enclosed = weekly_windows(&hours)
            .iter()
            .any(|hours_window| hours_window.encloses(window));
        if !enclosed {
            return Err(AppError(BookingError::BusinessRule(format!(
                "availability window {}-{} lies outside business hours",
                window.start, window.end
            ))));
        }
    }

    let rows: Vec<_> = windows
        .iter()
        .map(|w| (schedule::weekday_index(w.weekday), w.start, w.end))
        .collect();
    let window_count = provider::replace_availability_windows(&state.db_pool, provider_id, &rows)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(SetWindowsResponse {
        provider_id,
        window_count,
        updated_at: Utc::now(),
    }))
}

/// Replaces a provider's weekly blocked windows. Each must be a subset of
/// one of that weekday's availability windows.
#[axum::debug_handler]
pub async fn set_unavailability(
    State(state): State<Arc<ApiState>>,
    Path(provider_id): Path<Uuid>,
    Json(payload): Json<SetWindowsRequest>,
) -> Result<Json<SetWindowsResponse>, AppError> {
    provider::get_provider_by_id(&state.db_pool, provider_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Provider {provider_id} not found")))?;

    let windows = windows_from_request(&payload.windows)?;

    for window in &windows {
        let weekday = schedule::weekday_index(window.weekday);
        let availability =
            provider::get_availability_windows(&state.db_pool, provider_id, weekday)
                .await
                .map_err(BookingError::Database)?;
        let enclosed = weekly_windows(&availability)
            .iter()
            .any(|avail| avail.encloses(window));
        if !enclosed {
            return Err(AppError(BookingError::BusinessRule(format!(
                "unavailability window {}-{} is not inside an availability window",
                window.start, window.end
            ))));
        }
    }

    let rows: Vec<_> = windows
        .iter()
        .map(|w| (schedule::weekday_index(w.weekday), w.start, w.end))
        .collect();
    let window_count =
        provider::replace_unavailability_windows(&state.db_pool, provider_id, &rows)
            .await
            .map_err(BookingError::Database)?;

    Ok(Json(SetWindowsResponse {
        provider_id,
        window_count,
        updated_at: Utc::now(),
    }))
}

/// Converts request windows to typed weekly values, rejecting bad weekday
/// indexes and inverted ranges.
pub(crate) fn windows_from_request(
    requests: &[WeeklyWindowRequest],
) -> Result<Vec<WeeklyWindow>, AppError> {
    requests
        .iter()
        .map(|req| {
            let weekday = schedule::weekday_from_index(req.weekday).ok_or_else(|| {
                AppError(BookingError::Validation(format!(
                    "weekday must be in 0..=6, got {}",
                    req.weekday
                )))
            })?;
            WeeklyWindow::new(weekday, req.start, req.end)
                .map_err(|e| AppError(BookingError::Validation(e.to_string())))
        })
        .collect()
}

fn weekly_windows(rows: &[DbWeeklyWindow]) -> Vec<WeeklyWindow> {
    rows.iter()
        .filter_map(|row| {
            let weekday = schedule::weekday_from_index(row.weekday)?;
            WeeklyWindow::new(weekday, row.start_time, row.end_time).ok()
        })
        .collect()
}
