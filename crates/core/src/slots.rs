//! Slot-walk algorithm over resolved absolute intervals.
//!
//! Given a provider's resolved availability for one calendar date, the
//! calculator subtracts blocked intervals (unavailability windows and
//! existing bookings) and walks the remaining free sub-intervals at the
//! provider's slot granularity. A candidate is emitted iff
//! `[start, start + duration)` fits entirely inside one free sub-interval,
//! so a candidate ending exactly where a block starts is valid.
//!
//! Output here is advisory: the authoritative conflict check happens at
//! write time inside the booking transaction, never from a listing.

use chrono::{DateTime, Duration, Utc};

use crate::interval::{subtract_all, Interval};

/// Why a requested interval fails window validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowViolation {
    OutsideAvailability,
    InsideUnavailability,
}

/// Checks that `requested` lies entirely within one availability interval
/// and overlaps no unavailability interval. All inputs are resolved absolute
/// intervals for the same calendar date.
pub fn check_within_windows(
    requested: Interval,
    availability: &[Interval],
    unavailability: &[Interval],
) -> Result<(), WindowViolation> {
    if !availability.iter().any(|window| window.contains(&requested)) {
        return Err(WindowViolation::OutsideAvailability);
    }
    if unavailability.iter().any(|block| block.overlaps(&requested)) {
        return Err(WindowViolation::InsideUnavailability);
    }
    Ok(())
}

/// Candidate start instants for one resolved availability interval.
///
/// Subtracts `blocks` from `availability`, then walks each free sub-interval
/// from its own start in `granularity` steps. The returned iterator is lazy,
/// finite, and recomputed fresh by every caller; nothing is cached across
/// calls because availability changes with every booking.
pub fn candidate_starts(
    availability: Interval,
    blocks: &[Interval],
    granularity: Duration,
    duration: Duration,
) -> impl Iterator<Item = DateTime<Utc>> {
    let free = if duration <= Duration::zero() || granularity <= Duration::zero() {
        Vec::new()
    } else {
        subtract_all(availability, blocks)
    };

    free.into_iter().flat_map(move |sub| WalkSlots {
        cursor: sub.start,
        end: sub.end,
        granularity,
        duration,
    })
}

struct WalkSlots {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Duration,
    duration: Duration,
}

impl Iterator for WalkSlots {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        // Fits iff the candidate ends at or before the free sub-interval end.
        if self.cursor + self.duration > self.end {
            return None;
        }
        let start = self.cursor;
        self.cursor += self.granularity;
        Some(start)
    }
}
