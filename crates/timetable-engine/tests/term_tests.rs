//! Tests for academic term resolution.

use std::sync::Arc;
use std::thread;

use timetable_engine::term::normalize_label;
use timetable_engine::{
    resolve_term, EngineError, Field, MemoryRepository, ScheduleInput, Scheduler,
};

#[test]
fn resolving_twice_returns_the_same_term() {
    let repo = MemoryRepository::new();
    let first = resolve_term(&repo, "2026-2027").unwrap();
    let second = resolve_term(&repo, "2026-2027").unwrap();
    assert_eq!(first, second);
    assert_eq!(repo.snapshot().terms().len(), 1);
}

#[test]
fn labels_are_trimmed_before_lookup() {
    let repo = MemoryRepository::new();
    let padded = resolve_term(&repo, "  2026-2027 ").unwrap();
    assert_eq!(padded.label, "2026-2027");
    assert_eq!(resolve_term(&repo, "2026-2027").unwrap().id, padded.id);
}

#[test]
fn distinct_labels_get_distinct_terms() {
    let repo = MemoryRepository::new();
    let a = resolve_term(&repo, "2026-2027").unwrap();
    let b = resolve_term(&repo, "2027-2028").unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn blank_label_is_a_validation_error() {
    let repo = MemoryRepository::new();
    let err = resolve_term(&repo, "   ").unwrap_err();
    match err {
        EngineError::Validation(v) => assert_eq!(v.missing_fields(), &[Field::AcademicYear]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(normalize_label("").is_err());
    assert_eq!(normalize_label(" x ").unwrap(), "x");
}

#[test]
fn concurrent_resolution_creates_one_term() {
    let repo = Arc::new(MemoryRepository::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || resolve_term(&*repo, "2026-2027").unwrap())
        })
        .collect();

    let terms: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(terms.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(repo.snapshot().terms().len(), 1);
}

#[test]
fn concurrent_bookings_in_a_new_year_share_its_term() {
    let scheduler = Arc::new(Scheduler::new(MemoryRepository::new()));
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                let input = ScheduleInput {
                    faculty: Some(format!("F{i}")),
                    subject: Some("CS101".into()),
                    section_course: Some(format!("S{i}")),
                    room: Some(format!("R{i}")),
                    academic_year: Some("2026-2027".into()),
                    day: Some("THU".into()),
                    start_time: Some("9:00 AM".into()),
                    end_time: Some("10:00 AM".into()),
                    semester: Some("First".into()),
                };
                scheduler.create_schedule(&input).unwrap()
            })
        })
        .collect();

    let entries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(entries.windows(2).all(|w| w[0].term == w[1].term));
    let snapshot = scheduler.repository().snapshot();
    assert_eq!(snapshot.terms().len(), 1);
    assert_eq!(snapshot.entries().len(), 6);
}

#[test]
fn concurrent_identical_bookings_admit_exactly_one() {
    let scheduler = Arc::new(Scheduler::new(MemoryRepository::new()));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || {
                // Same room and slot, different faculty and section.
                let input = ScheduleInput {
                    faculty: Some(format!("F{i}")),
                    subject: Some("CS101".into()),
                    section_course: Some(format!("S{i}")),
                    room: Some("101".into()),
                    academic_year: Some("2026-2027".into()),
                    day: Some("MON".into()),
                    start_time: Some("9:00 AM".into()),
                    end_time: Some("10:00 AM".into()),
                    semester: Some("First".into()),
                };
                scheduler.create_schedule(&input).is_ok()
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(scheduler.repository().len(), 1);
}
