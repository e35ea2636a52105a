//! Turn raw schedule input into a validated candidate.
//!
//! Input arrives as loosely typed strings (form fields, JSON). The builder checks
//! that every required field is present, decodes day, times and semester, and
//! rejects empty or inverted time ranges so that nothing malformed reaches the
//! conflict detector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{parse_time_of_day, Day, DayPolicy};
use crate::error::{FormatError, ValidationError, Violation};
use crate::model::{ResourceRef, ScheduleDraft, Semester, TermId};
use crate::overlap::TimeRange;

/// Required input fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Faculty,
    Subject,
    SectionCourse,
    Room,
    AcademicYear,
    Day,
    StartTime,
    EndTime,
    Semester,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Faculty => "faculty",
            Field::Subject => "subject",
            Field::SectionCourse => "sectionCourse",
            Field::Room => "room",
            Field::AcademicYear => "academicYear",
            Field::Day => "day",
            Field::StartTime => "startTime",
            Field::EndTime => "endTime",
            Field::Semester => "semester",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleInput {
    pub faculty: Option<String>,
    pub subject: Option<String>,
    pub section_course: Option<String>,
    pub room: Option<String>,
    pub academic_year: Option<String>,
    pub day: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub semester: Option<String>,
}

/// Validated input whose academic year has not been resolved to a term yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub day: Day,
    pub range: TimeRange,
    pub faculty: ResourceRef,
    pub room: ResourceRef,
    pub section: ResourceRef,
    pub subject: ResourceRef,
    pub academic_year: String,
    pub semester: Semester,
}

impl Candidate {
    pub fn into_draft(self, term: TermId) -> ScheduleDraft {
        ScheduleDraft {
            day: self.day,
            time_start: self.range.start(),
            time_end: self.range.end(),
            faculty: self.faculty,
            room: self.room,
            section: self.section,
            subject: self.subject,
            term,
            semester: self.semester,
        }
    }
}

/// Validate `input` rejecting unknown day codes.
pub fn build_candidate(input: &ScheduleInput) -> Result<Candidate, ValidationError> {
    build_candidate_with(input, DayPolicy::Reject)
}

/// Validate `input`, decoding the day according to `policy`.
///
/// Missing fields are collected into a single [`Violation::MissingFields`];
/// malformed values and an inverted range are reported alongside it.
pub fn build_candidate_with(
    input: &ScheduleInput,
    policy: DayPolicy,
) -> Result<Candidate, ValidationError> {
    let mut missing = Vec::new();
    let mut violations = Vec::new();

    let faculty = required(&input.faculty, Field::Faculty, &mut missing);
    let subject = required(&input.subject, Field::Subject, &mut missing);
    let section = required(&input.section_course, Field::SectionCourse, &mut missing);
    let room = required(&input.room, Field::Room, &mut missing);
    let academic_year = required(&input.academic_year, Field::AcademicYear, &mut missing);
    let day_raw = required(&input.day, Field::Day, &mut missing);
    let start_raw = required(&input.start_time, Field::StartTime, &mut missing);
    let end_raw = required(&input.end_time, Field::EndTime, &mut missing);
    let semester_raw = required(&input.semester, Field::Semester, &mut missing);

    let day = decode(day_raw, Field::Day, &mut violations, |s| policy.parse_day(s));
    let start = decode(start_raw, Field::StartTime, &mut violations, parse_time_of_day);
    let end = decode(end_raw, Field::EndTime, &mut violations, parse_time_of_day);
    let semester = decode(semester_raw, Field::Semester, &mut violations, str::parse::<Semester>);

    let range = match (start, end) {
        (Some(start), Some(end)) => {
            let range = TimeRange::new(start, end);
            if range.is_none() {
                violations.push(Violation::InvalidRange { start, end });
            }
            range
        }
        _ => None,
    };

    if !missing.is_empty() {
        violations.insert(0, Violation::MissingFields(missing));
    }

    // Each violation above leaves its slot as None, so this only matches clean input.
    let (
        Some(faculty),
        Some(subject),
        Some(section),
        Some(room),
        Some(academic_year),
        Some(day),
        Some(range),
        Some(semester),
    ) = (faculty, subject, section, room, academic_year, day, range, semester)
    else {
        return Err(ValidationError::new(violations));
    };

    Ok(Candidate {
        day,
        range,
        faculty: ResourceRef::new(faculty),
        room: ResourceRef::new(room),
        section: ResourceRef::new(section),
        subject: ResourceRef::new(subject),
        academic_year: academic_year.to_string(),
        semester,
    })
}

/// Trimmed non-blank value, or record the field as missing.
fn required<'a>(
    value: &'a Option<String>,
    field: Field,
    missing: &mut Vec<Field>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(field);
            None
        }
    }
}

fn decode<T>(
    raw: Option<&str>,
    field: Field,
    violations: &mut Vec<Violation>,
    parse: impl FnOnce(&str) -> Result<T, FormatError>,
) -> Option<T> {
    match parse(raw?) {
        Ok(value) => Some(value),
        Err(source) => {
            violations.push(Violation::InvalidValue { field, source });
            None
        }
    }
}

