//! # Slot Listing Handler
//!
//! Computes bookable candidate start instants for a provider over a range
//! of business-local calendar days.
//!
//! ## Algorithm
//!
//! For each calendar date in the requested range:
//!
//! 1. Resolve that weekday's availability windows to absolute UTC intervals
//!    against the business's IANA zone
//! 2. Resolve the unavailability windows the same way and collect the
//!    provider's existing pending/scheduled booking intervals
//! 3. Subtract both sets of blocks from each availability interval
//! 4. Walk the remaining free sub-intervals at the provider's configured
//!    slot granularity, emitting a candidate iff the full duration fits
//!
//! The sequence is recomputed fresh on every call; availability changes with
//! every booking, so nothing is cached. The output is advisory: the booking
//! transaction re-validates authoritatively at write time, and a stale slot
//! surfaces there as a conflict.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::{
    errors::BookingError,
    interval::Interval,
    models::provider::SlotsResponse,
    schedule::{self, WeeklyWindow},
    slots::candidate_starts,
};
use slotbook_db::models::DbWeeklyWindow;
use slotbook_db::repositories::{booking, business, provider};

use crate::{middleware::error_handling::AppError, ApiState};

/// Longest slot-listing range accepted, in calendar days.
const MAX_RANGE_DAYS: i64 = 62;

/// Query parameters for the slot listing endpoint.
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// Requested appointment duration in minutes
    pub duration: i64,

    /// First business-local calendar day of the range (inclusive)
    pub from: NaiveDate,

    /// Last business-local calendar day of the range (inclusive)
    pub to: NaiveDate,
}

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<Arc<ApiState>>,
    Path((business_id, provider_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    if query.duration <= 0 {
        return Err(AppError(BookingError::Validation(
            "duration must be a positive number of minutes".to_string(),
        )));
    }
    if query.from > query.to {
        return Err(AppError(BookingError::Validation(
            "from must not be after to".to_string(),
        )));
    }
    if (query.to - query.from).num_days() >= MAX_RANGE_DAYS {
        return Err(AppError(BookingError::Validation(format!(
            "date range must span fewer than {MAX_RANGE_DAYS} days"
        ))));
    }

    let biz = business::get_business_by_id(&state.db_pool, business_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Business {business_id} not found")))?;
    let zone = schedule::parse_zone(&biz.timezone)
        .map_err(|e| BookingError::Internal(Box::new(e)))?;

    let prov = provider::get_provider_by_id(&state.db_pool, provider_id)
        .await
        .map_err(BookingError::Database)?
        .filter(|p| p.business_id == business_id && p.active)
        .ok_or_else(|| BookingError::NotFound(format!("Provider {provider_id} not found")))?;

    let granularity = Duration::minutes(i64::from(prov.slot_granularity_minutes));
    let duration = Duration::minutes(query.duration);

    let mut slots = Vec::new();
    for date in query.from.iter_days().take_while(|d| *d <= query.to) {
        let weekday = schedule::weekday_index(date.weekday());

        let availability_rows =
            provider::get_availability_windows(&state.db_pool, provider_id, weekday)
                .await
                .map_err(BookingError::Database)?;
        if availability_rows.is_empty() {
            continue;
        }
        let unavailability_rows =
            provider::get_unavailability_windows(&state.db_pool, provider_id, weekday)
                .await
                .map_err(BookingError::Database)?;

        let availability = resolve_rows(&availability_rows, date, zone);
        let unavailability = resolve_rows(&unavailability_rows, date, zone);

        for window in availability {
            let booked = booking::provider_booked_intervals(&state.db_pool, provider_id, window)
                .await
                .map_err(BookingError::Database)?;

            let mut blocks = unavailability.clone();
            blocks.extend(booked);

            slots.extend(candidate_starts(window, &blocks, granularity, duration));
        }
    }
    slots.sort();

    Ok(Json(SlotsResponse {
        provider_id,
        duration_minutes: query.duration,
        slots,
    }))
}

/// Resolves weekly window rows for one calendar date. A window boundary
/// falling into a spring-forward gap makes the window unresolvable for that
/// date; it is skipped and logged.
fn resolve_rows(rows: &[DbWeeklyWindow], date: NaiveDate, zone: Tz) -> Vec<Interval> {
    rows.iter()
        .filter_map(|row| {
            let weekday = schedule::weekday_from_index(row.weekday)?;
            let window = WeeklyWindow::new(weekday, row.start_time, row.end_time).ok()?;
            match window.resolve(date, zone) {
                Ok(interval) => Some(interval),
                Err(err) => {
                    tracing::warn!("Skipping window {} on {}: {}", row.id, date, err);
                    None
                }
            }
        })
        .collect()
}
