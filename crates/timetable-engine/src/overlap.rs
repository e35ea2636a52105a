//! Half-open interval overlap.
//!
//! Every occupancy comparison in the crate goes through [`overlaps`]. Intervals are
//! `[start, end)`, so a booking that ends at 10:00 and one that starts at 10:00
//! do not collide.

use std::fmt;

use crate::codec::TimeOfDay;

/// Two half-open intervals overlap iff `a_start < b_end && b_start < a_end`.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A non-empty `[start, end)` range within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeRange {
    /// Returns `None` unless `end > start`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        (end > start).then_some(TimeRange { start, end })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Length of the shared portion, `min(ends) - max(starts)`, or 0 when disjoint.
    pub fn overlap_minutes(&self, other: &TimeRange) -> u16 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.minutes() - start.minutes()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
