use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create businesses table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS businesses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            timezone VARCHAR(64) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create providers table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS providers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            business_id UUID NOT NULL REFERENCES businesses(id),
            display_name VARCHAR(255) NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            slot_granularity_minutes INTEGER NOT NULL DEFAULT 30,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT positive_granularity CHECK (slot_granularity_minutes > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create business_hours table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS business_hours (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES businesses(id),
            weekday SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT business_hours_valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT business_hours_valid_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availability_windows table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_windows (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES providers(id),
            weekday SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT availability_valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT availability_valid_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create unavailability_windows table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS unavailability_windows (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES providers(id),
            weekday SMALLINT NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT unavailability_valid_weekday CHECK (weekday BETWEEN 0 AND 6),
            CONSTRAINT unavailability_valid_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            business_id UUID NOT NULL REFERENCES businesses(id),
            name VARCHAR(255) NOT NULL,
            price_cents BIGINT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            CONSTRAINT positive_duration CHECK (duration_minutes > 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            business_id UUID NOT NULL REFERENCES businesses(id),
            customer_id UUID NOT NULL,
            scheduled_start TIMESTAMP WITH TIME ZONE NOT NULL,
            scheduled_end TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(32) NOT NULL,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_schedule_range CHECK (scheduled_end > scheduled_start),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'scheduled', 'canceled', 'completed'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create booking_line_items table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_line_items (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            booking_id UUID NOT NULL REFERENCES bookings(id),
            provider_id UUID NOT NULL REFERENCES providers(id),
            service_id UUID NOT NULL REFERENCES services(id),
            price_cents BIGINT NOT NULL,
            duration_minutes INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create payment_records table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payment_records (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            booking_id UUID NOT NULL REFERENCES bookings(id),
            amount_cents BIGINT NOT NULL,
            status VARCHAR(32) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_payment_status CHECK (status IN ('pending', 'succeeded', 'refunded'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_providers_business_id ON providers(business_id);
        CREATE INDEX IF NOT EXISTS idx_business_hours_owner ON business_hours(owner_id, weekday);
        CREATE INDEX IF NOT EXISTS idx_availability_owner ON availability_windows(owner_id, weekday);
        CREATE INDEX IF NOT EXISTS idx_unavailability_owner ON unavailability_windows(owner_id, weekday);
        CREATE INDEX IF NOT EXISTS idx_services_business_id ON services(business_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_business_id ON bookings(business_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_start ON bookings(scheduled_start);
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_line_items_booking_id ON booking_line_items(booking_id);
        CREATE INDEX IF NOT EXISTS idx_line_items_provider_id ON booking_line_items(provider_id);
        CREATE INDEX IF NOT EXISTS idx_payment_records_booking_id ON payment_records(booking_id);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
