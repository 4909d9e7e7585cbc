//! The transactional booking engine: reservation, reschedule, cancellation.
//!
//! Every mutation runs a single short-lived transaction with a
//! read-validate-write sequence. Write access to a provider's day is
//! serialized with `pg_advisory_xact_lock` keyed on (provider, local date),
//! taken in sorted provider order, so two actors contending for the same
//! interval cannot both observe "no conflict". The overlap predicate
//! evaluated after the lock is the sole source of truth; slot listings are
//! advisory and staleness surfaces as a conflict error.
//!
//! On any error after the first write the transaction is dropped without
//! commit, which rolls it back in full. No half-completed reschedule or
//! cancellation is ever observable.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use eyre::Result;
use sqlx::{PgConnection, Pool, Postgres};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use uuid::Uuid;

use slotbook_core::access::{Action, ActorRole};
use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::interval::Interval;
use slotbook_core::models::booking::BookingStatus;
use slotbook_core::schedule::{self, WeeklyWindow};
use slotbook_core::slots::{check_within_windows, WindowViolation};

use crate::models::{DbBooking, DbBookingLineItem, DbService, DbWeeklyWindow};
use crate::repositories::{business, payment, provider, service};

pub struct NewBooking<'a> {
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub provider_ids: &'a [Uuid],
    pub service_ids: &'a [Uuid],
    pub start: DateTime<Utc>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RescheduleOutcome {
    pub old_booking_id: Uuid,
    pub new_booking_id: Uuid,
    pub new_booking: DbBooking,
}

#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub previous_status: BookingStatus,
    pub new_status: BookingStatus,
    pub timestamp: DateTime<Utc>,
}

/// Validates and commits a new booking.
///
/// The availability re-check here is authoritative and independent of
/// whatever a slot listing previously returned; a stale listing surfaces as
/// `Conflict` at the overlap scan inside the transaction.
pub async fn create_booking(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    req: NewBooking<'_>,
) -> BookingResult<(DbBooking, Vec<DbBookingLineItem>)> {
    if req.provider_ids.is_empty() {
        return Err(BookingError::Validation(
            "at least one provider is required".to_string(),
        ));
    }
    if req.service_ids.is_empty() {
        return Err(BookingError::Validation(
            "at least one service is required".to_string(),
        ));
    }
    if req.start <= now {
        return Err(BookingError::Validation(
            "booking start must be in the future".to_string(),
        ));
    }

    let assignments = pair_providers_with_services(req.provider_ids, req.service_ids)?;

    let zone = business_zone(pool, req.business_id).await?;
    let services = services_by_id(pool, req.business_id, req.service_ids).await?;

    let total_minutes: i64 = assignments
        .iter()
        .map(|(_, service_id)| i64::from(services[service_id].duration_minutes))
        .sum();
    if total_minutes <= 0 {
        return Err(BookingError::Validation(
            "requested services resolve to zero duration".to_string(),
        ));
    }

    let end = req.start + Duration::minutes(total_minutes);
    let requested = Interval::new(req.start, end).ok_or_else(|| {
        BookingError::Validation("requested interval is empty".to_string())
    })?;

    let providers: BTreeSet<Uuid> = assignments.iter().map(|(p, _)| *p).collect();

    // Authoritative window re-validation, per provider, before any write.
    let mut conn = pool.acquire().await.map_err(BookingError::database)?;
    for provider_id in &providers {
        provider::get_provider_by_id(&mut *conn, *provider_id)
            .await
            .map_err(BookingError::Database)?
            .filter(|p| p.business_id == req.business_id && p.active)
            .ok_or_else(|| {
                BookingError::NotFound(format!("Provider {provider_id} not found"))
            })?;
        validate_provider_interval(&mut conn, *provider_id, requested, zone).await?;
    }
    drop(conn);

    let mut tx = pool.begin().await.map_err(BookingError::database)?;

    let date = schedule::local_date(requested.start, zone);
    lock_provider_days(&mut tx, &providers, date).await?;

    let provider_list: Vec<Uuid> = providers.iter().copied().collect();
    let conflicts = find_conflicts(&mut tx, &provider_list, requested, None).await?;
    if !conflicts.is_empty() {
        return Err(BookingError::Conflict(format!(
            "{} overlapping booking(s) found for the requested interval",
            conflicts.len()
        )));
    }

    let booking = insert_booking(
        &mut tx,
        req.business_id,
        req.customer_id,
        requested,
        BookingStatus::Scheduled,
        req.notes,
    )
    .await?;

    let mut line_items = Vec::with_capacity(assignments.len());
    for (provider_id, service_id) in &assignments {
        let svc = &services[service_id];
        line_items.push(
            insert_line_item(
                &mut tx,
                booking.id,
                *provider_id,
                *service_id,
                svc.price_cents,
                svc.duration_minutes,
            )
            .await?,
        );
    }

    tx.commit().await.map_err(BookingError::database)?;

    tracing::debug!(
        "Booking created: id={}, start={}, end={}, providers={}",
        booking.id,
        booking.scheduled_start,
        booking.scheduled_end,
        provider_list.len()
    );
    Ok((booking, line_items))
}

/// Atomically cancels a booking and creates its replacement at a new start.
///
/// Cancel-and-recreate (rather than in-place mutation) keeps an immutable
/// record of the original slot, reduces the payment repoint to a single
/// foreign-key update, and makes the rollback path trivial.
pub async fn reschedule_booking(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    booking_id: Uuid,
    customer_id: Uuid,
    new_start: DateTime<Utc>,
) -> BookingResult<RescheduleOutcome> {
    let booking = get_booking_by_id(pool, booking_id)
        .await
        .map_err(BookingError::Database)?
        // Ownership failure reads the same as absence.
        .filter(|b| b.customer_id == customer_id)
        .ok_or_else(|| BookingError::NotFound(format!("Booking {booking_id} not found")))?;

    let status = parse_status(&booking.status)?;
    if status != BookingStatus::Scheduled {
        return Err(BookingError::Conflict(format!(
            "booking {booking_id} is {status}, only scheduled bookings can be rescheduled"
        )));
    }
    if new_start <= now {
        return Err(BookingError::Validation(
            "new start must be in the future".to_string(),
        ));
    }

    let zone = business_zone(pool, booking.business_id).await?;
    let original_date = schedule::local_date(booking.scheduled_start, zone);
    if original_date == schedule::local_date(now, zone) {
        return Err(BookingError::BusinessRule(
            "a booking cannot be rescheduled on the day of the appointment".to_string(),
        ));
    }

    let mut tx = pool.begin().await.map_err(BookingError::database)?;

    // Conditional transition: zero rows means a concurrent actor got here
    // first and the pre-checks above are stale.
    let canceled = sqlx::query(
        r#"
        UPDATE bookings
        SET status = 'canceled'
        WHERE id = $1 AND status = 'scheduled'
        "#,
    )
    .bind(booking_id)
    .execute(&mut *tx)
    .await
    .map_err(BookingError::database)?;
    if canceled.rows_affected() == 0 {
        tx.rollback().await.map_err(BookingError::database)?;
        return Err(BookingError::Conflict(format!(
            "booking {booking_id} was modified concurrently"
        )));
    }

    // Duration is preserved across reschedule.
    let line_items = get_line_items_by_booking(&mut *tx, booking_id)
        .await
        .map_err(BookingError::Database)?;
    let total_minutes: i64 = line_items
        .iter()
        .map(|li| i64::from(li.duration_minutes))
        .sum();
    let new_end = new_start + Duration::minutes(total_minutes);
    let requested = Interval::new(new_start, new_end).ok_or_else(|| {
        BookingError::Validation("requested interval is empty".to_string())
    })?;

    // Providers are re-checked in full; one deactivated since the original
    // booking must not receive its replacement.
    let providers: BTreeSet<Uuid> = line_items.iter().map(|li| li.provider_id).collect();
    for provider_id in &providers {
        provider::get_provider_by_id(&mut *tx, *provider_id)
            .await
            .map_err(BookingError::Database)?
            .filter(|p| p.business_id == booking.business_id && p.active)
            .ok_or_else(|| {
                BookingError::NotFound(format!("Provider {provider_id} not found"))
            })?;
        validate_provider_interval(&mut tx, *provider_id, requested, zone).await?;
    }

    let date = schedule::local_date(requested.start, zone);
    lock_provider_days(&mut tx, &providers, date).await?;

    let provider_list: Vec<Uuid> = providers.iter().copied().collect();
    let conflicts = find_conflicts(&mut tx, &provider_list, requested, Some(booking_id)).await?;
    if !conflicts.is_empty() {
        return Err(BookingError::Conflict(format!(
            "{} overlapping booking(s) found at the new interval",
            conflicts.len()
        )));
    }

    let new_booking = insert_booking(
        &mut tx,
        booking.business_id,
        booking.customer_id,
        requested,
        BookingStatus::Scheduled,
        booking.notes.as_deref(),
    )
    .await?;

    for li in &line_items {
        insert_line_item(
            &mut tx,
            new_booking.id,
            li.provider_id,
            li.service_id,
            li.price_cents,
            li.duration_minutes,
        )
        .await?;
    }

    payment::repoint_payment_records(&mut tx, booking_id, new_booking.id)
        .await
        .map_err(BookingError::Database)?;

    tx.commit().await.map_err(BookingError::database)?;

    tracing::debug!(
        "Booking rescheduled: old={}, new={}, start={}",
        booking_id,
        new_booking.id,
        new_booking.scheduled_start
    );
    Ok(RescheduleOutcome {
        old_booking_id: booking_id,
        new_booking_id: new_booking.id,
        new_booking,
    })
}

/// Cancels a scheduled booking and refunds its payment records.
///
/// Re-cancelling an already-canceled booking is an error, not an
/// idempotent success.
pub async fn cancel_booking(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
    booking_id: Uuid,
    actor_id: Uuid,
    actor_role: ActorRole,
) -> BookingResult<CancelOutcome> {
    if !actor_role.may(Action::CancelBooking) {
        return Err(BookingError::BusinessRule(format!(
            "role {actor_role:?} may not cancel bookings"
        )));
    }

    let mut tx = pool.begin().await.map_err(BookingError::database)?;

    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, business_id, customer_id, scheduled_start, scheduled_end, status, notes, created_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(BookingError::database)?
    .ok_or_else(|| BookingError::NotFound(format!("Booking {booking_id} not found")))?;

    let owns = match actor_role {
        ActorRole::Customer => booking.customer_id == actor_id,
        ActorRole::Provider => sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM booking_line_items
                WHERE booking_id = $1 AND provider_id = $2
            )
            "#,
        )
        .bind(booking_id)
        .bind(actor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(BookingError::database)?,
    };
    if !owns {
        return Err(BookingError::NotFound(format!(
            "Booking {booking_id} not found"
        )));
    }

    let previous_status = parse_status(&booking.status)?;
    if previous_status != BookingStatus::Scheduled {
        return Err(BookingError::Conflict(format!(
            "booking {booking_id} is {previous_status}, only scheduled bookings can be canceled"
        )));
    }

    let zone = business_zone(&mut *tx, booking.business_id).await?;
    if schedule::local_date(booking.scheduled_start, zone) == schedule::local_date(now, zone) {
        return Err(BookingError::BusinessRule(
            "a booking cannot be canceled on the day of the appointment".to_string(),
        ));
    }

    sqlx::query("UPDATE bookings SET status = 'canceled' WHERE id = $1")
        .bind(booking_id)
        .execute(&mut *tx)
        .await
        .map_err(BookingError::database)?;

    payment::refund_payment_records(&mut tx, booking_id)
        .await
        .map_err(BookingError::Database)?;

    tx.commit().await.map_err(BookingError::database)?;

    tracing::debug!("Booking canceled: id={}, actor={}", booking_id, actor_id);
    Ok(CancelOutcome {
        previous_status,
        new_status: BookingStatus::Canceled,
        timestamp: now,
    })
}

pub async fn get_booking_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbBooking>>
where
    E: sqlx::PgExecutor<'e>,
{
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, business_id, customer_id, scheduled_start, scheduled_end, status, notes, created_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(booking)
}

pub async fn get_line_items_by_booking<'e, E>(
    executor: E,
    booking_id: Uuid,
) -> Result<Vec<DbBookingLineItem>>
where
    E: sqlx::PgExecutor<'e>,
{
    let line_items = sqlx::query_as::<_, DbBookingLineItem>(
        r#"
        SELECT id, booking_id, provider_id, service_id, price_cents, duration_minutes
        FROM booking_line_items
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(line_items)
}

/// Intervals of pending/scheduled bookings touching `window` for a provider,
/// ascending. Fed into the slot calculator as blocks to subtract.
pub async fn provider_booked_intervals<'e, E>(
    executor: E,
    provider_id: Uuid,
    window: Interval,
) -> Result<Vec<Interval>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT b.scheduled_start, b.scheduled_end
        FROM bookings b
        JOIN booking_line_items li ON li.booking_id = b.id
        WHERE li.provider_id = $1
          AND b.status IN ('pending', 'scheduled')
          AND b.scheduled_start < $2
          AND b.scheduled_end > $3
        ORDER BY b.scheduled_start ASC
        "#,
    )
    .bind(provider_id)
    .bind(window.end)
    .bind(window.start)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(start, end)| Interval::new(start, end))
        .collect())
}

/// One provider takes every service; multiple providers pair with services
/// positionally.
fn pair_providers_with_services(
    provider_ids: &[Uuid],
    service_ids: &[Uuid],
) -> BookingResult<Vec<(Uuid, Uuid)>> {
    if provider_ids.len() == 1 {
        Ok(service_ids
            .iter()
            .map(|service_id| (provider_ids[0], *service_id))
            .collect())
    } else if provider_ids.len() == service_ids.len() {
        Ok(provider_ids
            .iter()
            .copied()
            .zip(service_ids.iter().copied())
            .collect())
    } else {
        Err(BookingError::Validation(
            "provider_ids must contain one entry, or one entry per service".to_string(),
        ))
    }
}

async fn business_zone<'e, E>(executor: E, business_id: Uuid) -> BookingResult<Tz>
where
    E: sqlx::PgExecutor<'e>,
{
    let biz = business::get_business_by_id(executor, business_id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound(format!("Business {business_id} not found")))?;

    // The zone was validated when the business was created; failure here
    // means corrupt reference data.
    schedule::parse_zone(&biz.timezone).map_err(|e| BookingError::Internal(Box::new(e)))
}

async fn services_by_id(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    service_ids: &[Uuid],
) -> BookingResult<HashMap<Uuid, DbService>> {
    let services = service::get_services_by_ids(pool, service_ids)
        .await
        .map_err(BookingError::Database)?;
    let by_id: HashMap<Uuid, DbService> = services.into_iter().map(|s| (s.id, s)).collect();

    for service_id in service_ids {
        let svc = by_id.get(service_id).ok_or_else(|| {
            BookingError::NotFound(format!("Service {service_id} not found"))
        })?;
        if svc.business_id != business_id {
            return Err(BookingError::NotFound(format!(
                "Service {service_id} not found"
            )));
        }
    }
    Ok(by_id)
}

fn parse_status(status: &str) -> BookingResult<BookingStatus> {
    BookingStatus::from_str(status).map_err(|msg| BookingError::Internal(msg.into()))
}

/// Resolves weekly window rows against a concrete date. A window whose
/// boundary does not exist on that date (spring-forward gap) is skipped; it
/// cannot admit any interval.
fn resolved_windows(rows: &[DbWeeklyWindow], date: NaiveDate, zone: Tz) -> Vec<Interval> {
    rows.iter()
        .filter_map(|row| {
            let weekday = schedule::weekday_from_index(row.weekday)?;
            let window = WeeklyWindow::new(weekday, row.start_time, row.end_time).ok()?;
            match window.resolve(date, zone) {
                Ok(interval) => Some(interval),
                Err(err) => {
                    tracing::warn!("Skipping unresolvable window {}: {}", row.id, err);
                    None
                }
            }
        })
        .collect()
}

/// The requested interval must lie entirely within one availability window
/// for the local weekday of its start, and intersect no unavailability
/// window. All comparisons happen on resolved absolute intervals.
async fn validate_provider_interval(
    conn: &mut PgConnection,
    provider_id: Uuid,
    requested: Interval,
    zone: Tz,
) -> BookingResult<()> {
    let date = schedule::local_date(requested.start, zone);
    let weekday = schedule::weekday_index(date.weekday());

    let availability_rows = provider::get_availability_windows(&mut *conn, provider_id, weekday)
        .await
        .map_err(BookingError::Database)?;
    let unavailability_rows =
        provider::get_unavailability_windows(&mut *conn, provider_id, weekday)
            .await
            .map_err(BookingError::Database)?;

    let availability = resolved_windows(&availability_rows, date, zone);
    let unavailability = resolved_windows(&unavailability_rows, date, zone);

    match check_within_windows(requested, &availability, &unavailability) {
        Ok(()) => Ok(()),
        Err(WindowViolation::OutsideAvailability) => Err(BookingError::BusinessRule(format!(
            "requested interval is outside provider {provider_id}'s availability on {date}"
        ))),
        Err(WindowViolation::InsideUnavailability) => Err(BookingError::BusinessRule(format!(
            "requested interval intersects an unavailability window of provider {provider_id} on {date}"
        ))),
    }
}

/// Stable 64-bit advisory lock key for one provider-day (FNV-1a over the
/// provider id and the date's day number).
fn day_lock_key(provider_id: Uuid, date: NaiveDate) -> i64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in provider_id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    for byte in date.num_days_from_ce().to_be_bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash as i64
}

/// Serializes writers per (provider, local day). Sorted order (BTreeSet)
/// avoids lock-order deadlocks between multi-provider bookings.
async fn lock_provider_days(
    conn: &mut PgConnection,
    provider_ids: &BTreeSet<Uuid>,
    date: NaiveDate,
) -> BookingResult<()> {
    for provider_id in provider_ids {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(day_lock_key(*provider_id, date))
            .execute(&mut *conn)
            .await
            .map_err(BookingError::database)?;
    }
    Ok(())
}

/// The authoritative overlap scan, evaluated while holding the provider-day
/// locks: `existing.start < requested.end AND existing.end > requested.start`.
async fn find_conflicts(
    conn: &mut PgConnection,
    provider_ids: &[Uuid],
    requested: Interval,
    exclude_booking: Option<Uuid>,
) -> BookingResult<Vec<Uuid>> {
    let conflicts: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT b.id
        FROM bookings b
        JOIN booking_line_items li ON li.booking_id = b.id
        WHERE li.provider_id = ANY($1)
          AND b.status IN ('pending', 'scheduled')
          AND b.scheduled_start < $2
          AND b.scheduled_end > $3
          AND b.id <> $4
        "#,
    )
    .bind(provider_ids.to_vec())
    .bind(requested.end)
    .bind(requested.start)
    .bind(exclude_booking.unwrap_or_else(Uuid::nil))
    .fetch_all(conn)
    .await
    .map_err(BookingError::database)?;

    Ok(conflicts)
}

async fn insert_booking(
    conn: &mut PgConnection,
    business_id: Uuid,
    customer_id: Uuid,
    interval: Interval,
    status: BookingStatus,
    notes: Option<&str>,
) -> BookingResult<DbBooking> {
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, business_id, customer_id, scheduled_start, scheduled_end, status, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, business_id, customer_id, scheduled_start, scheduled_end, status, notes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(business_id)
    .bind(customer_id)
    .bind(interval.start)
    .bind(interval.end)
    .bind(status.as_str())
    .bind(notes)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
    .map_err(BookingError::database)?;

    Ok(booking)
}

async fn insert_line_item(
    conn: &mut PgConnection,
    booking_id: Uuid,
    provider_id: Uuid,
    service_id: Uuid,
    price_cents: i64,
    duration_minutes: i32,
) -> BookingResult<DbBookingLineItem> {
    let line_item = sqlx::query_as::<_, DbBookingLineItem>(
        r#"
        INSERT INTO booking_line_items (id, booking_id, provider_id, service_id, price_cents, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, booking_id, provider_id, service_id, price_cents, duration_minutes
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking_id)
    .bind(provider_id)
    .bind(service_id)
    .bind(price_cents)
    .bind(duration_minutes)
    .fetch_one(conn)
    .await
    .map_err(BookingError::database)?;

    Ok(line_item)
}
