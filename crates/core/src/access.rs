//! Actor capability table.
//!
//! Authorization for engine operations lives in one place instead of
//! scattered role comparisons. Ownership (a customer owns the booking, a
//! provider is assigned to a line item) is checked separately at the data
//! layer; this table answers only whether the role may attempt the action.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Provider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewAvailability,
    CreateBooking,
    RescheduleBooking,
    CancelBooking,
}

impl ActorRole {
    pub fn may(self, action: Action) -> bool {
        use Action::*;
        use ActorRole::*;

        match (self, action) {
            (_, ViewAvailability) => true,
            (Customer, CreateBooking) => true,
            (Customer, RescheduleBooking) => true,
            (Customer, CancelBooking) => true,
            (Provider, CancelBooking) => true,
            (Provider, CreateBooking) => false,
            (Provider, RescheduleBooking) => false,
        }
    }
}
