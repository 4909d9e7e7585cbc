use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::access::ActorRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Scheduled,
    Canceled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "scheduled" => Ok(BookingStatus::Scheduled),
            "canceled" => Ok(BookingStatus::Canceled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

/// Instants in requests arrive as RFC 3339 strings and are parsed by the
/// handler so that a missing offset surfaces as a validation error rather
/// than an implicit-local-time guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub business_id: Uuid,
    pub provider_ids: Vec<Uuid>,
    pub service_ids: Vec<Uuid>,
    pub customer_id: Uuid,
    pub start: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub line_items: Vec<LineItemResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemResponse {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub price_cents: i64,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleBookingRequest {
    pub customer_id: Uuid,
    pub new_start: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleBookingResponse {
    pub old_booking_id: Uuid,
    pub new_booking_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub actor_id: Uuid,
    pub actor_role: ActorRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub previous_status: BookingStatus,
    pub new_status: BookingStatus,
    pub timestamp: DateTime<Utc>,
}
