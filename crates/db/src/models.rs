use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBusiness {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProvider {
    pub id: Uuid,
    pub business_id: Uuid,
    pub display_name: String,
    pub active: bool,
    pub slot_granularity_minutes: i32,
    pub created_at: DateTime<Utc>,
}

/// Recurring weekly window rows share a shape across business_hours,
/// availability_windows, and unavailability_windows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWeeklyWindow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingLineItem {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPaymentRecord {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
