use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A half-open absolute interval `[start, end)` in UTC.
///
/// All overlap and subtraction arithmetic in the engine happens on these
/// resolved intervals; local wall-clock values never enter a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Returns `None` if the interval would be empty or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Two half-open intervals overlap iff each starts before the other ends.
    /// Touching at a boundary is not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Removes `block` from this interval, yielding zero, one, or two
    /// remainders in ascending order.
    pub fn subtract(&self, block: &Interval) -> Vec<Interval> {
        if !self.overlaps(block) {
            return vec![*self];
        }

        let mut parts = Vec::with_capacity(2);
        if let Some(before) = Interval::new(self.start, block.start) {
            parts.push(before);
        }
        if let Some(after) = Interval::new(block.end, self.end) {
            parts.push(after);
        }
        parts
    }
}

/// Subtracts every block from `base`, returning the free sub-intervals in
/// ascending order.
pub fn subtract_all(base: Interval, blocks: &[Interval]) -> Vec<Interval> {
    let mut free = vec![base];
    for block in blocks {
        free = free
            .into_iter()
            .flat_map(|interval| interval.subtract(block))
            .collect();
    }
    free
}
