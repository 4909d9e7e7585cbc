use crate::models::DbService;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_service(
    pool: &Pool<Postgres>,
    business_id: Uuid,
    name: &str,
    price_cents: i64,
    duration_minutes: i32,
) -> Result<DbService> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating service: id={}, business_id={}, name={}, duration={}m",
        id,
        business_id,
        name,
        duration_minutes
    );

    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, business_id, name, price_cents, duration_minutes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, business_id, name, price_cents, duration_minutes
        "#,
    )
    .bind(id)
    .bind(business_id)
    .bind(name)
    .bind(price_cents)
    .bind(duration_minutes)
    .fetch_one(pool)
    .await?;

    Ok(service)
}

pub async fn get_services_by_ids<'e, E>(executor: E, ids: &[Uuid]) -> Result<Vec<DbService>>
where
    E: sqlx::PgExecutor<'e>,
{
    let services = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, business_id, name, price_cents, duration_minutes
        FROM services
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids.to_vec())
    .fetch_all(executor)
    .await?;

    Ok(services)
}
