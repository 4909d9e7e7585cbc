use crate::models::{DbBusiness, DbWeeklyWindow};
use chrono::{NaiveTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_business(
    pool: &Pool<Postgres>,
    name: &str,
    timezone: &str,
) -> Result<DbBusiness> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating business: id={}, name={}, timezone={}", id, name, timezone);

    let business = sqlx::query_as::<_, DbBusiness>(
        r#"
        INSERT INTO businesses (id, name, timezone, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, timezone, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(timezone)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(business)
}

pub async fn get_business_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<DbBusiness>>
where
    E: sqlx::PgExecutor<'e>,
{
    let business = sqlx::query_as::<_, DbBusiness>(
        r#"
        SELECT id, name, timezone, created_at
        FROM businesses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(business)
}

pub async fn get_business_hours<'e, E>(
    executor: E,
    business_id: Uuid,
    weekday: i16,
) -> Result<Vec<DbWeeklyWindow>>
where
    E: sqlx::PgExecutor<'e>,
{
    let windows = sqlx::query_as::<_, DbWeeklyWindow>(
        r#"
        SELECT id, owner_id, weekday, start_time, end_time
        FROM business_hours
        WHERE owner_id = $1 AND weekday = $2
        ORDER BY start_time ASC
        "#,
    )
    .bind(business_id)
    .bind(weekday)
    .fetch_all(executor)
    .await?;

    Ok(windows)
}

/// Replaces the business's weekly operating hours in one transaction.
pub async fn replace_business_hours(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    windows: &[(i16, NaiveTime, NaiveTime)],
) -> Result<usize> {
    tracing::debug!(
        "Replacing business hours: business_id={}, windows={}",
        business_id,
        windows.len()
    );

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM business_hours WHERE owner_id = $1")
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

    for (weekday, start_time, end_time) in windows {
        sqlx::query(
            r#"
            INSERT INTO business_hours (id, owner_id, weekday, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(business_id)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(windows.len())
}
