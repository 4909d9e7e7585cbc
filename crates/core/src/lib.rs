//! # Slotbook Core
//!
//! Domain types and scheduling arithmetic for the slotbook booking engine.
//! This crate is deliberately free of database and HTTP dependencies: it
//! holds the error taxonomy, the clock abstraction, timezone-aware interval
//! arithmetic, the slot-walk algorithm, and the actor capability table.
//!
//! All booking instants are absolute UTC (`DateTime<Utc>`). Recurring weekly
//! windows are local wall-clock values and only become comparable intervals
//! through [`schedule::WeeklyWindow::resolve`] against a concrete calendar
//! date and IANA zone.

pub mod access;
pub mod clock;
pub mod errors;
pub mod interval;
pub mod models;
pub mod schedule;
pub mod slots;
