//! Error types for timetable-engine operations.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::builder::Field;
use crate::codec::TimeOfDay;
use crate::model::{Axis, EntryId, ResourceRef, ScheduleEntry, TermId};

/// A time, day, semester or axis string that could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("time '{0}' is missing an AM/PM marker")]
    MissingMeridiem(String),

    #[error("time '{0}' is not of the form H:MM AM|PM")]
    InvalidNumeral(String),

    #[error("hour {0} is out of range")]
    HourOutOfRange(u32),

    #[error("minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),

    #[error("{0} minutes is past the end of the day")]
    MinutesOutOfRange(u16),

    #[error("unknown day code '{0}' (expected SUN..SAT)")]
    UnknownDay(String),

    #[error("unknown semester '{0}' (expected First, Second or Summer)")]
    UnknownSemester(String),

    #[error("unknown axis '{0}' (expected room, faculty or section)")]
    UnknownAxis(String),
}

/// A single problem found while validating schedule input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Every required field that was absent or blank.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),

    #[error("invalid {field}: {source}")]
    InvalidValue { field: Field, source: FormatError },

    #[error("end time {end} must be after start time {start}")]
    InvalidRange { start: TimeOfDay, end: TimeOfDay },
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// All violations found in one piece of input, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        ValidationError { violations }
    }

    pub fn missing(fields: Vec<Field>) -> Self {
        ValidationError::new(vec![Violation::MissingFields(fields)])
    }

    /// Fields reported as missing, empty if none were.
    pub fn missing_fields(&self) -> &[Field] {
        self.violations
            .iter()
            .find_map(|v| match v {
                Violation::MissingFields(fields) => Some(fields.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn is_invalid_range(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::InvalidRange { .. }))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        write!(f, "invalid schedule input: {}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// A valid booking that collides with an existing one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} {resource_label} is already scheduled during this time.", .axis.title())]
pub struct ConflictError {
    pub axis: Axis,
    pub resource: ResourceRef,
    /// Display name of the contested resource (falls back to the raw reference).
    pub resource_label: String,
    pub existing: ScheduleEntry,
}

/// Failures raised by a schedule repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("entry {0} does not exist")]
    MissingEntry(EntryId),

    #[error("term {0} does not exist")]
    MissingTerm(TermId),

    /// Storage-level uniqueness check rejected a write.
    #[error("{axis} slot already taken by entry {existing}")]
    SlotTaken { axis: Axis, existing: EntryId },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot format error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A snapshot that parsed but breaks a store invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level error returned by [`Scheduler`](crate::service::Scheduler) operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(Box<ConflictError>),

    #[error("schedule entry {0} not found")]
    NotFound(EntryId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ConflictError> for EngineError {
    fn from(err: ConflictError) -> Self {
        EngineError::Conflict(Box::new(err))
    }
}

impl EngineError {
    pub fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            EngineError::Conflict(c) => Some(&**c),
            _ => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EngineError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
