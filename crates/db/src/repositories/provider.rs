use crate::models::{DbProvider, DbWeeklyWindow};
use chrono::{NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_provider(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    display_name: &str,
    slot_granularity_minutes: i32,
) -> Result<DbProvider> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating provider: id={}, business_id={}, display_name={}",
        id,
        business_id,
        display_name
    );

    let provider = sqlx::query_as::<_, DbProvider>(
        r#"
        INSERT INTO providers (id, business_id, display_name, active, slot_granularity_minutes, created_at)
        VALUES ($1, $2, $3, TRUE, $4, $5)
        RETURNING id, business_id, display_name, active, slot_granularity_minutes, created_at
        "#,
    )
    .bind(id)
    .bind(business_id)
    .bind(display_name)
    .bind(slot_granularity_minutes)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(provider)
}

pub async fn get_provider_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbProvider>>
where
    E: sqlx::PgExecutor<'e>,
{
    let provider = sqlx::query_as::<_, DbProvider>(
        r#"
        SELECT id, business_id, display_name, active, slot_granularity_minutes, created_at
        FROM providers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(provider)
}

pub async fn get_availability_windows<'e, E>(
    executor: E,
    provider_id: Uuid,
    weekday: i16,
) -> Result<Vec<DbWeeklyWindow>>
where
    E: sqlx::PgExecutor<'e>,
{
    let windows = sqlx::query_as::<_, DbWeeklyWindow>(
        r#"
        SELECT id, owner_id, weekday, start_time, end_time
        FROM availability_windows
        WHERE owner_id = $1 AND weekday = $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(provider_id)
    .bind(weekday)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}

pub async fn get_unavailability_windows<'e, E>(
    executor: E,
    provider_id: Uuid,
    weekday: i16,
) -> Result<Vec<DbWeeklyWindow>>
where
    E: sqlx::PgExecutor<'e>,
{
    let windows = sqlx::query_as::<_, DbWeeklyWindow>(
        r#"
        SELECT id, owner_id, weekday, start_time, end_time
        FROM unavailability_windows
        WHERE owner_id = $1 AND weekday = $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(provider_id)
    .bind(weekday)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}

/// Replaces the provider's weekly availability windows in one transaction.
pub async fn replace_availability_windows(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    windows: &[(i16, NaiveTime, NaiveTime)],
) -> Result<usize> {
    replace_windows(pool, "availability_windows", provider_id, windows).await
}

/// Replaces the provider's weekly blocked windows in one transaction.
pub async fn replace_unavailability_windows(
    pool: &Pool<Postgres>,
    provider_id: Uuid,
    windows: &[(i16, NaiveTime, NaiveTime)],
) -> Result<usize> {
    replace_windows(pool, "unavailability_windows", provider_id, windows).await
}

async fn replace_windows(
    pool: &Pool<Postgres>,
    table: &str,
    provider_id: Uuid,
    windows: &[(i16, NaiveTime, NaiveTime)],
) -> Result<usize> {
    tracing::debug!(
        "Replacing windows: table={}, provider_id={}, windows={}",
        table,
        provider_id,
        windows.len()
    );

    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DELETE FROM {table} WHERE owner_id = $1"))
        .bind(provider_id)
        .execute(&mut *tx)
        .await?;

    let insert = format!(
        "INSERT INTO {table} (id, owner_id, weekday, start_time, end_time) VALUES ($1, $2, $3, $4, $5)"
    );
    for (weekday, start_time, end_time) in windows {
        sqlx::query(&insert)
            .bind(Uuid::new_v4())
            .bind(provider_id)
            .bind(weekday)
            .bind(start_time)
            .bind(end_time)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(windows.len())
}
