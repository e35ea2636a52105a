//! Detect double bookings for a candidate schedule entry.
//!
//! A candidate is checked against existing rows on each [`Axis`] in
//! [`Axis::PRIORITY`] order (room, then faculty, then section). Only rows on the
//! same day, term and semester are considered, and only the first collision is
//! reported. Adjacent bookings (one ends exactly when the other starts) are NOT
//! conflicts.

use tracing::debug;

use crate::error::ConflictError;
use crate::model::{Axis, AxisQuery, EntryId, ScheduleDraft, ScheduleEntry};
use crate::overlap::overlaps;
use crate::repository::{RepositoryResult, ScheduleReader};

/// The first collision found for a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub axis: Axis,
    pub existing: ScheduleEntry,
}

/// Outcome of [`check_conflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResult {
    Clear,
    Conflict(Conflict),
}

impl ConflictResult {
    pub fn is_clear(&self) -> bool {
        matches!(self, ConflictResult::Clear)
    }

    pub fn conflict(&self) -> Option<&Conflict> {
        match self {
            ConflictResult::Clear => None,
            ConflictResult::Conflict(c) => Some(c),
        }
    }

    pub fn into_conflict(self) -> Option<Conflict> {
        match self {
            ConflictResult::Clear => None,
            ConflictResult::Conflict(c) => Some(c),
        }
    }
}

/// Check `candidate` against stored rows, ignoring `exclude` (the entry being updated).
///
/// Performs no writes.
pub fn check_conflict<R>(
    reader: &R,
    candidate: &ScheduleDraft,
    exclude: Option<EntryId>,
) -> RepositoryResult<ConflictResult>
where
    R: ScheduleReader + ?Sized,
{
    for axis in Axis::PRIORITY {
        if let Some(existing) = find_axis_conflict(reader, axis, candidate, exclude)? {
            return Ok(ConflictResult::Conflict(Conflict { axis, existing }));
        }
    }
    Ok(ConflictResult::Clear)
}

/// First stored row on `axis` whose interval overlaps the candidate's.
pub fn find_axis_conflict<R>(
    reader: &R,
    axis: Axis,
    candidate: &ScheduleDraft,
    exclude: Option<EntryId>,
) -> RepositoryResult<Option<ScheduleEntry>>
where
    R: ScheduleReader + ?Sized,
{
    let query = AxisQuery::for_draft(axis, candidate, exclude);
    let rows = reader.find_by_axis(&query)?;
    debug!(
        axis = axis.as_str(),
        resource = %query.resource,
        day = %query.day,
        rows = rows.len(),
        "scanning axis"
    );

    Ok(rows.into_iter().find(|row| {
        overlaps(
            candidate.time_start,
            candidate.time_end,
            row.time_start,
            row.time_end,
        )
    }))
}

impl ConflictError {
    /// Attach the contested resource's display name to a detected conflict.
    pub fn describe<R>(reader: &R, conflict: Conflict) -> RepositoryResult<ConflictError>
    where
        R: ScheduleReader + ?Sized,
    {
        let resource = conflict.existing.axis_ref(conflict.axis).clone();
        let resource_label = reader
            .resource_label(conflict.axis, &resource)?
            .unwrap_or_else(|| resource.to_string());
        Ok(ConflictError {
            axis: conflict.axis,
            resource,
            resource_label,
            existing: conflict.existing,
        })
    }
}
