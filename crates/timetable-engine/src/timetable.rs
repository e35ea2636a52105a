//! Weekly timetable view and free-slot computation.
//!
//! Groups entries by weekday and sorts each day by start time. Free slots are the
//! gaps between merged busy periods within a daily window: entries are clipped to
//! the window, overlapping or adjacent periods are merged, and the remaining
//! gaps are returned.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::codec::{Day, TimeOfDay};
use crate::model::ScheduleEntry;
use crate::overlap::TimeRange;

/// Entries of one faculty member, room or section laid out by weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyTimetable {
    days: BTreeMap<Day, Vec<ScheduleEntry>>,
}

impl WeeklyTimetable {
    pub fn from_entries(entries: impl IntoIterator<Item = ScheduleEntry>) -> Self {
        let mut days: BTreeMap<Day, Vec<ScheduleEntry>> = BTreeMap::new();
        for entry in entries {
            days.entry(entry.day).or_default().push(entry);
        }
        for slots in days.values_mut() {
            slots.sort_by_key(|e| (e.time_start, e.time_end, e.id));
        }
        WeeklyTimetable { days }
    }

    /// Entries on `day`, sorted by start time.
    pub fn day(&self, day: Day) -> &[ScheduleEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days that have at least one entry, SUN first.
    pub fn days(&self) -> impl Iterator<Item = (Day, &[ScheduleEntry])> {
        self.days.iter().map(|(day, e)| (*day, e.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Merged busy periods on `day`, clipped to `window`.
    pub fn busy_periods(&self, day: Day, window: TimeRange) -> Vec<TimeRange> {
        let mut intervals: Vec<(TimeOfDay, TimeOfDay)> = self
            .day(day)
            .iter()
            .filter(|e| e.occupies(window.start(), window.end()))
            .map(|e| (e.time_start.max(window.start()), e.time_end.min(window.end())))
            .collect();
        intervals.sort();

        let mut merged: Vec<(TimeOfDay, TimeOfDay)> = Vec::new();
        for (start, end) in intervals {
            if let Some(last) = merged.last_mut() {
                if start <= last.1 {
                    last.1 = last.1.max(end);
                    continue;
                }
            }
            merged.push((start, end));
        }

        merged
            .into_iter()
            .filter_map(|(start, end)| TimeRange::new(start, end))
            .collect()
    }

    /// Gaps on `day` within `window` not covered by any entry.
    pub fn free_slots(&self, day: Day, window: TimeRange) -> Vec<TimeRange> {
        let mut free = Vec::new();
        let mut cursor = window.start();
        for busy in self.busy_periods(day, window) {
            if let Some(gap) = TimeRange::new(cursor, busy.start()) {
                free.push(gap);
            }
            cursor = cursor.max(busy.end());
        }
        if let Some(tail) = TimeRange::new(cursor, window.end()) {
            free.push(tail);
        }
        free
    }

    /// Plain-text rendering, one block per day.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (day, entries) in self.days() {
            let _ = writeln!(out, "{}", day);
            for e in entries {
                let _ = writeln!(
                    out,
                    "  {:>8} - {:<8}  #{:<4} {:<12} room {:<8} faculty {:<16} section {}",
                    e.time_start,
                    e.time_end,
                    e.id,
                    e.subject,
                    e.room,
                    e.faculty,
                    e.section
                );
            }
        }
        out
    }
}
