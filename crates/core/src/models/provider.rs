use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    /// IANA zone name, e.g. "America/New_York".
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub business_id: Uuid,
    pub display_name: String,
    pub active: bool,
    pub slot_granularity_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBusinessRequest {
    pub name: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderRequest {
    pub business_id: Uuid,
    pub display_name: String,
    pub slot_granularity_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub business_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

/// One recurring weekly window in a replace-all request. Weekday uses the
/// storage convention 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyWindowRequest {
    pub weekday: i16,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetWindowsRequest {
    pub windows: Vec<WeeklyWindowRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetWindowsResponse {
    pub provider_id: Uuid,
    pub window_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBusinessHoursResponse {
    pub business_id: Uuid,
    pub window_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub provider_id: Uuid,
    pub duration_minutes: i64,
    pub slots: Vec<DateTime<Utc>>,
}
