//! Schedule entries, academic terms and the references they carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{Day, TimeOfDay};
use crate::error::FormatError;
use crate::overlap::{overlaps, TimeRange};

/// Identifier of a stored schedule entry. Assigned on insert, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of an [`AcademicTerm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(pub u64);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Opaque reference to an externally owned record (faculty, room, section, subject).
///
/// The engine only compares references for equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(value: impl Into<String>) -> Self {
        ResourceRef(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(value: &str) -> Self {
        ResourceRef(value.to_string())
    }
}

impl From<String> for ResourceRef {
    fn from(value: String) -> Self {
        ResourceRef(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semester {
    First,
    Second,
    Summer,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Semester::First => "First",
            Semester::Second => "Second",
            Semester::Summer => "Summer",
        }
    }
}

impl FromStr for Semester {
    type Err = FormatError;

    /// Case-insensitive; accepts `first`/`1st`, `second`/`2nd`, `summer`, with an
    /// optional trailing `semester`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let head = lowered
            .strip_suffix("semester")
            .map(str::trim_end)
            .unwrap_or(&lowered);
        match head {
            "first" | "1st" => Ok(Semester::First),
            "second" | "2nd" => Ok(Semester::Second),
            "summer" => Ok(Semester::Summer),
            _ => Err(FormatError::UnknownSemester(s.to_string())),
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An academic year label such as `"2024-2025"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicTerm {
    pub id: TermId,
    pub label: String,
}

/// One of the three resources a booking occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Room,
    Faculty,
    Section,
}

impl Axis {
    /// Order in which axes are checked; the first conflicting axis is reported.
    pub const PRIORITY: [Axis; 3] = [Axis::Room, Axis::Faculty, Axis::Section];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Room => "room",
            Axis::Faculty => "faculty",
            Axis::Section => "section",
        }
    }

    /// Capitalized noun used in conflict messages.
    pub fn title(self) -> &'static str {
        match self {
            Axis::Room => "Room",
            Axis::Faculty => "Faculty",
            Axis::Section => "Section",
        }
    }
}

impl FromStr for Axis {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "room" => Ok(Axis::Room),
            "faculty" => Ok(Axis::Faculty),
            "section" => Ok(Axis::Section),
            _ => Err(FormatError::UnknownAxis(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A booking that has passed validation but has no identity yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub day: Day,
    pub time_start: TimeOfDay,
    pub time_end: TimeOfDay,
    pub faculty: ResourceRef,
    pub room: ResourceRef,
    pub section: ResourceRef,
    pub subject: ResourceRef,
    pub term: TermId,
    pub semester: Semester,
}

impl ScheduleDraft {
    pub fn axis_ref(&self, axis: Axis) -> &ResourceRef {
        match axis {
            Axis::Room => &self.room,
            Axis::Faculty => &self.faculty,
            Axis::Section => &self.section,
        }
    }

    pub fn range(&self) -> Option<TimeRange> {
        TimeRange::new(self.time_start, self.time_end)
    }
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub day: Day,
    pub time_start: TimeOfDay,
    pub time_end: TimeOfDay,
    pub faculty: ResourceRef,
    pub room: ResourceRef,
    pub section: ResourceRef,
    pub subject: ResourceRef,
    pub term: TermId,
    pub semester: Semester,
}

impl ScheduleEntry {
    pub fn new(id: EntryId, draft: ScheduleDraft) -> Self {
        ScheduleEntry {
            id,
            day: draft.day,
            time_start: draft.time_start,
            time_end: draft.time_end,
            faculty: draft.faculty,
            room: draft.room,
            section: draft.section,
            subject: draft.subject,
            term: draft.term,
            semester: draft.semester,
        }
    }

    pub fn axis_ref(&self, axis: Axis) -> &ResourceRef {
        match axis {
            Axis::Room => &self.room,
            Axis::Faculty => &self.faculty,
            Axis::Section => &self.section,
        }
    }

    pub fn range(&self) -> Option<TimeRange> {
        TimeRange::new(self.time_start, self.time_end)
    }

    /// True when this entry occupies any part of `[start, end)`.
    pub fn occupies(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        overlaps(self.time_start, self.time_end, start, end)
    }
}

/// Rows sharing one resource on one day within one term and semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisQuery {
    pub axis: Axis,
    pub resource: ResourceRef,
    pub day: Day,
    pub term: TermId,
    pub semester: Semester,
    /// Entry to leave out of the result, used when re-checking an update.
    pub exclude: Option<EntryId>,
}

impl AxisQuery {
    pub fn for_draft(axis: Axis, draft: &ScheduleDraft, exclude: Option<EntryId>) -> Self {
        AxisQuery {
            axis,
            resource: draft.axis_ref(axis).clone(),
            day: draft.day,
            term: draft.term,
            semester: draft.semester,
            exclude,
        }
    }

    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        Some(entry.id) != self.exclude
            && entry.day == self.day
            && entry.term == self.term
            && entry.semester == self.semester
            && entry.axis_ref(self.axis) == &self.resource
    }
}

/// Caller-facing listing filter. All fields are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleFilter {
    pub faculty: Option<ResourceRef>,
    pub room: Option<ResourceRef>,
    pub section: Option<ResourceRef>,
    pub term_label: Option<String>,
    pub semester: Option<Semester>,
    pub day: Option<Day>,
}

/// Repository-level filter: like [`ScheduleFilter`] with the term already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub faculty: Option<ResourceRef>,
    pub room: Option<ResourceRef>,
    pub section: Option<ResourceRef>,
    pub term: Option<TermId>,
    pub semester: Option<Semester>,
    pub day: Option<Day>,
}

impl EntryFilter {
    pub fn from_schedule_filter(filter: &ScheduleFilter, term: Option<TermId>) -> Self {
        EntryFilter {
            faculty: filter.faculty.clone(),
            room: filter.room.clone(),
            section: filter.section.clone(),
            term,
            semester: filter.semester,
            day: filter.day,
        }
    }

    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        fn accepts<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().is_none_or(|w| w == actual)
        }
        accepts(&self.faculty, &entry.faculty)
            && accepts(&self.room, &entry.room)
            && accepts(&self.section, &entry.section)
            && accepts(&self.term, &entry.term)
            && accepts(&self.semester, &entry.semester)
            && accepts(&self.day, &entry.day)
    }
}
