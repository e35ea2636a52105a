//! Tests for input validation.

use timetable_engine::builder::build_candidate_with;
use timetable_engine::{
    build_candidate, Day, DayPolicy, Field, FormatError, ScheduleInput, Semester, TermId,
    ValidationError, Violation,
};

fn full_input() -> ScheduleInput {
    ScheduleInput {
        faculty: Some("F-001".into()),
        subject: Some("CS101".into()),
        section_course: Some("BSCS-1A".into()),
        room: Some("101".into()),
        academic_year: Some("2024-2025".into()),
        day: Some("MON".into()),
        start_time: Some("9:00 AM".into()),
        end_time: Some("10:00 AM".into()),
        semester: Some("First".into()),
    }
}

fn rejected(input: &ScheduleInput) -> ValidationError {
    build_candidate(input).expect_err("input should be rejected")
}

#[test]
fn complete_input_builds_candidate() {
    let candidate = build_candidate(&full_input()).unwrap();
    assert_eq!(candidate.day, Day::Mon);
    assert_eq!(candidate.range.start().minutes(), 9 * 60);
    assert_eq!(candidate.range.end().minutes(), 10 * 60);
    assert_eq!(candidate.room.as_str(), "101");
    assert_eq!(candidate.faculty.as_str(), "F-001");
    assert_eq!(candidate.section.as_str(), "BSCS-1A");
    assert_eq!(candidate.academic_year, "2024-2025");
    assert_eq!(candidate.semester, Semester::First);
}

#[test]
fn candidate_becomes_draft_for_term() {
    let draft = build_candidate(&full_input()).unwrap().into_draft(TermId(7));
    assert_eq!(draft.term, TermId(7));
    assert_eq!(draft.day, Day::Mon);
    assert_eq!(draft.subject.as_str(), "CS101");
    assert!(draft.time_start < draft.time_end);
}

#[test]
fn values_are_trimmed() {
    let input = ScheduleInput {
        room: Some("  101 ".into()),
        academic_year: Some(" 2024-2025\n".into()),
        ..full_input()
    };
    let candidate = build_candidate(&input).unwrap();
    assert_eq!(candidate.room.as_str(), "101");
    assert_eq!(candidate.academic_year, "2024-2025");
}

#[test]
fn empty_input_lists_every_field() {
    let err = rejected(&ScheduleInput::default());
    assert_eq!(
        err.missing_fields(),
        &[
            Field::Faculty,
            Field::Subject,
            Field::SectionCourse,
            Field::Room,
            Field::AcademicYear,
            Field::Day,
            Field::StartTime,
            Field::EndTime,
            Field::Semester,
        ]
    );
    assert_eq!(err.violations.len(), 1);
}

#[test]
fn blank_values_count_as_missing() {
    let input = ScheduleInput {
        room: Some("   ".into()),
        subject: Some(String::new()),
        ..full_input()
    };
    let err = rejected(&input);
    assert_eq!(err.missing_fields(), &[Field::Subject, Field::Room]);
}

#[test]
fn missing_fields_come_first_and_other_problems_are_kept() {
    let input = ScheduleInput {
        faculty: None,
        day: Some("FUNDAY".into()),
        ..full_input()
    };
    let err = rejected(&input);
    assert_eq!(err.violations[0], Violation::MissingFields(vec![Field::Faculty]));
    assert_eq!(
        err.violations[1],
        Violation::InvalidValue {
            field: Field::Day,
            source: FormatError::UnknownDay("FUNDAY".into()),
        }
    );
}

#[test]
fn end_before_start_is_invalid_range() {
    let input = ScheduleInput {
        start_time: Some("11:00 AM".into()),
        end_time: Some("10:00 AM".into()),
        ..full_input()
    };
    let err = rejected(&input);
    assert!(err.is_invalid_range());
    assert!(err.missing_fields().is_empty());
}

#[test]
fn zero_length_range_is_invalid() {
    let input = ScheduleInput {
        start_time: Some("10:00 AM".into()),
        end_time: Some("10:00 AM".into()),
        ..full_input()
    };
    assert!(rejected(&input).is_invalid_range());
}

#[test]
fn malformed_time_is_reported_per_field() {
    let input = ScheduleInput {
        end_time: Some("10:00".into()),
        ..full_input()
    };
    let err = rejected(&input);
    assert!(matches!(
        &err.violations[..],
        [Violation::InvalidValue {
            field: Field::EndTime,
            source: FormatError::MissingMeridiem(_),
        }]
    ));
    assert!(!err.is_invalid_range());
}

#[test]
fn unknown_semester_is_rejected() {
    let input = ScheduleInput {
        semester: Some("Fall".into()),
        ..full_input()
    };
    let err = rejected(&input);
    assert!(matches!(
        &err.violations[..],
        [Violation::InvalidValue {
            field: Field::Semester,
            ..
        }]
    ));
}

#[test]
fn semester_spellings_are_accepted() {
    for (text, expected) in [
        ("first", Semester::First),
        ("1st Semester", Semester::First),
        ("SECOND", Semester::Second),
        ("2nd", Semester::Second),
        ("Summer", Semester::Summer),
    ] {
        let input = ScheduleInput {
            semester: Some(text.into()),
            ..full_input()
        };
        assert_eq!(build_candidate(&input).unwrap().semester, expected, "{text}");
    }
}

#[test]
fn unknown_day_follows_policy() {
    let input = ScheduleInput {
        day: Some("XYZ".into()),
        ..full_input()
    };
    assert!(build_candidate_with(&input, DayPolicy::Reject).is_err());
    let candidate = build_candidate_with(&input, DayPolicy::Monday).unwrap();
    assert_eq!(candidate.day, Day::Mon);
}

#[test]
fn error_message_names_the_problems() {
    let input = ScheduleInput {
        room: None,
        semester: None,
        ..full_input()
    };
    let err = rejected(&input);
    assert_eq!(
        err.to_string(),
        "invalid schedule input: missing required fields: room, semester"
    );
}

#[test]
fn input_deserializes_from_camel_case_json() {
    let json = r#"{
        "faculty": "F-001",
        "subject": "CS101",
        "sectionCourse": "BSCS-1A",
        "room": "101",
        "academicYear": "2024-2025",
        "day": "TUE",
        "startTime": "1:00 PM",
        "endTime": "2:30 PM",
        "semester": "Second"
    }"#;
    let input: ScheduleInput = serde_json::from_str(json).unwrap();
    let candidate = build_candidate(&input).unwrap();
    assert_eq!(candidate.day, Day::Tue);
    assert_eq!(candidate.range.duration_minutes(), 90);

    let partial: ScheduleInput = serde_json::from_str(r#"{"room": "101"}"#).unwrap();
    assert_eq!(rejected(&partial).missing_fields().len(), 8);
}
