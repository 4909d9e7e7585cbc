//! Payment records belong to the external payment subsystem. The engine
//! touches them in exactly two ways, both inside a booking transaction:
//! repointing `booking_id` during a reschedule and flipping status to
//! refunded during a cancellation.

use eyre::Result;
use sqlx::PgConnection;
use uuid::Uuid;

use slotbook_core::models::payment::PaymentStatus;

use crate::models::DbPaymentRecord;

/// Repoints every payment record from the old booking to its replacement.
/// Must run inside the same transaction that creates the replacement, so a
/// record is never observable pointing at an orphaned canceled booking.
pub async fn repoint_payment_records(
    conn: &mut PgConnection,
    old_booking_id: Uuid,
    new_booking_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE payment_records
        SET booking_id = $2
        WHERE booking_id = $1
        "#,
    )
    .bind(old_booking_id)
    .bind(new_booking_id)
    .execute(conn)
    .await?;

    tracing::debug!(
        "Repointed {} payment record(s): {} -> {}",
        result.rows_affected(),
        old_booking_id,
        new_booking_id
    );
    Ok(result.rows_affected())
}

/// Marks every not-yet-refunded payment record for the booking as refunded.
pub async fn refund_payment_records(conn: &mut PgConnection, booking_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE payment_records
        SET status = $2
        WHERE booking_id = $1 AND status <> $2
        "#,
    )
    .bind(booking_id)
    .bind(PaymentStatus::Refunded.as_str())
    .execute(conn)
    .await?;

    tracing::debug!(
        "Refunded {} payment record(s) for booking {}",
        result.rows_affected(),
        booking_id
    );
    Ok(result.rows_affected())
}

pub async fn get_payment_records_by_booking<'e, E>(
    executor: E,
    booking_id: Uuid,
) -> Result<Vec<DbPaymentRecord>>
where
    E: sqlx::PgExecutor<'e>,
{
    let records = sqlx::query_as::<_, DbPaymentRecord>(
        r#"
        SELECT id, booking_id, amount_cents, status, created_at
        FROM payment_records
        WHERE booking_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(booking_id)
    .fetch_all(executor)
    .await?;

    Ok(records)
}
