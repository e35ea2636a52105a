//! # timetable-engine
//!
//! Conflict-checked weekly class scheduling for university timetables.
//!
//! A booking places a subject for a section, taught by a faculty member, in a
//! room, on one weekday over a half-open `[start, end)` time range, within an
//! academic year and semester. The engine rejects any booking that would
//! double-book the room, the faculty member or the section, and reports which
//! resource collided and with what.
//!
//! ## Quick start
//!
//! ```rust
//! use timetable_engine::{MemoryRepository, ScheduleInput, Scheduler};
//!
//! let scheduler = Scheduler::new(MemoryRepository::new());
//! let mut input = ScheduleInput {
//!     faculty: Some("F-001".into()),
//!     subject: Some("CS101".into()),
//!     section_course: Some("BSCS-1A".into()),
//!     room: Some("101".into()),
//!     academic_year: Some("2024-2025".into()),
//!     day: Some("MON".into()),
//!     start_time: Some("9:00 AM".into()),
//!     end_time: Some("10:00 AM".into()),
//!     semester: Some("First".into()),
//! };
//! scheduler.create_schedule(&input).unwrap();
//!
//! input.start_time = Some("9:30 AM".into());
//! input.end_time = Some("10:30 AM".into());
//! let err = scheduler.create_schedule(&input).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Room 101 is already scheduled during this time."
//! );
//! ```
//!
//! ## Modules
//!
//! - [`codec`] — `"8:00 AM"` ⇄ minutes, `SUN..SAT` ⇄ ordinals
//! - [`overlap`] — the half-open interval predicate
//! - [`model`] — entries, terms, references, filters
//! - [`builder`] — input validation into a candidate
//! - [`conflict`] — per-axis conflict detection
//! - [`repository`] — storage contract
//! - [`memory`] — in-memory repository with JSON snapshots
//! - [`term`] — academic term resolution
//! - [`service`] — the [`Scheduler`] front door
//! - [`timetable`] — weekly view and free slots
//! - [`config`] — TOML configuration
//! - [`error`] — Error types

pub mod builder;
pub mod codec;
pub mod config;
pub mod conflict;
pub mod error;
pub mod memory;
pub mod model;
pub mod overlap;
pub mod repository;
pub mod service;
pub mod term;
pub mod timetable;

pub use builder::{build_candidate, Candidate, Field, ScheduleInput};
pub use codec::{
    day_to_ordinal, format_time_of_day, ordinal_to_day, parse_time_of_day, Day, DayPolicy,
    TimeOfDay,
};
pub use config::{Config, EngineConfig};
pub use conflict::{check_conflict, Conflict, ConflictResult};
pub use error::{
    ConfigError, ConflictError, EngineError, FormatError, RepositoryError, ValidationError,
    Violation,
};
pub use memory::{MemoryRepository, StoreLock};
pub use model::{
    AcademicTerm, Axis, EntryId, ResourceRef, ScheduleDraft, ScheduleEntry, ScheduleFilter,
    Semester, TermId,
};
pub use overlap::{overlaps, TimeRange};
pub use repository::{ScheduleReader, ScheduleRepository, ScheduleWriter};
pub use service::Scheduler;
pub use term::resolve_term;
pub use timetable::WeeklyTimetable;
