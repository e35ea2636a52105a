//! Conflict-checked create, update, delete and listing of schedule entries.
//!
//! Each write validates its input, resolves the academic year to a term, runs
//! the conflict detector and persists, all inside one repository transaction.
//! A rejected write leaves the repository untouched, including any term the
//! attempt would have created.

use tracing::{info, warn};

use crate::builder::{build_candidate_with, Candidate, ScheduleInput};
use crate::config::EngineConfig;
use crate::conflict::{check_conflict, ConflictResult};
use crate::error::{ConflictError, EngineError, Result};
use crate::model::{
    AcademicTerm, EntryFilter, EntryId, ScheduleDraft, ScheduleEntry, ScheduleFilter,
};
use crate::repository::{ScheduleReader, ScheduleRepository, ScheduleWriter};
use crate::term::{self, normalize_label};
use crate::timetable::WeeklyTimetable;

/// Front door of the engine, generic over the storage backend.
#[derive(Debug)]
pub struct Scheduler<R> {
    repo: R,
    config: EngineConfig,
}

impl<R: ScheduleRepository> Scheduler<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, EngineConfig::default())
    }

    pub fn with_config(repo: R, config: EngineConfig) -> Self {
        Scheduler { repo, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    fn candidate(&self, input: &ScheduleInput) -> Result<Candidate> {
        Ok(build_candidate_with(input, self.config.unknown_day)?)
    }

    /// Validate, conflict-check and store a new entry.
    ///
    /// # Errors
    /// - [`EngineError::Validation`] for missing or malformed input
    /// - [`EngineError::Conflict`] when room, faculty or section is already booked
    /// - [`EngineError::Repository`] when storage fails
    pub fn create_schedule(&self, input: &ScheduleInput) -> Result<ScheduleEntry> {
        let candidate = self.candidate(input)?;
        let entry = self.repo.with_transaction(|tx| {
            let term = term::resolve_in(tx, &candidate.academic_year)?;
            commit(tx, candidate.into_draft(term.id), None)
        })?;
        info!(id = %entry.id, day = %entry.day, room = %entry.room, "schedule entry created");
        Ok(entry)
    }

    /// Replace entry `id`, checking conflicts against every row except its own.
    ///
    /// # Errors
    /// As [`create_schedule`](Self::create_schedule), plus [`EngineError::NotFound`].
    pub fn update_schedule(&self, id: EntryId, input: &ScheduleInput) -> Result<ScheduleEntry> {
        let candidate = self.candidate(input)?;
        let entry = self.repo.with_transaction(|tx| {
            if tx.get(id)?.is_none() {
                return Err(EngineError::NotFound(id));
            }
            let term = term::resolve_in(tx, &candidate.academic_year)?;
            commit(tx, candidate.into_draft(term.id), Some(id))
        })?;
        info!(id = %entry.id, day = %entry.day, room = %entry.room, "schedule entry updated");
        Ok(entry)
    }

    /// Validate and conflict-check without writing anything.
    ///
    /// `exclude` names the entry being edited, if any. Returns the conflict that
    /// a write would hit, or `None` when the slot is free.
    pub fn check_schedule(
        &self,
        input: &ScheduleInput,
        exclude: Option<EntryId>,
    ) -> Result<Option<ConflictError>> {
        let candidate = self.candidate(input)?;
        self.repo.with_snapshot(|view| {
            // An unknown term has no bookings to collide with.
            let Some(term) = view.find_term(&candidate.academic_year)? else {
                return Ok(None);
            };
            let draft = candidate.into_draft(term.id);
            match check_conflict(view, &draft, exclude)? {
                ConflictResult::Clear => Ok(None),
                ConflictResult::Conflict(c) => Ok(Some(ConflictError::describe(view, c)?)),
            }
        })
    }

    /// Remove entry `id`. Deletion never consults the conflict detector.
    pub fn delete_schedule(&self, id: EntryId) -> Result<ScheduleEntry> {
        let removed = self
            .repo
            .with_transaction(|tx| tx.delete(id)?.ok_or(EngineError::NotFound(id)))?;
        info!(id = %removed.id, "schedule entry deleted");
        Ok(removed)
    }

    pub fn get_schedule(&self, id: EntryId) -> Result<ScheduleEntry> {
        self.repo
            .with_snapshot(|view| view.get(id)?.ok_or(EngineError::NotFound(id)))
    }

    /// Entries accepted by `filter`, ordered by day, start time and id.
    pub fn list_schedules(&self, filter: &ScheduleFilter) -> Result<Vec<ScheduleEntry>> {
        let mut entries = self.repo.with_snapshot(|view| {
            let term = match &filter.term_label {
                Some(label) => match view.find_term(label.trim())? {
                    Some(term) => Some(term.id),
                    None => return Ok(Vec::new()),
                },
                None => None,
            };
            Ok::<_, EngineError>(view.list(&EntryFilter::from_schedule_filter(filter, term))?)
        })?;
        entries.sort_by_key(|e| (e.day, e.time_start, e.id));
        Ok(entries)
    }

    /// Weekly view of the entries accepted by `filter`.
    pub fn weekly_timetable(&self, filter: &ScheduleFilter) -> Result<WeeklyTimetable> {
        Ok(WeeklyTimetable::from_entries(self.list_schedules(filter)?))
    }

    /// Resolve an academic-year label, creating the term if needed.
    pub fn resolve_term(&self, label: &str) -> Result<AcademicTerm> {
        term::resolve_term(&self.repo, label)
    }

    pub fn find_term(&self, label: &str) -> Result<Option<AcademicTerm>> {
        let label = normalize_label(label)?;
        self.repo.with_snapshot(|view| Ok(view.find_term(label)?))
    }
}

/// Conflict-check `draft` and write it, inserting or replacing `exclude`.
fn commit<W>(tx: &mut W, draft: ScheduleDraft, exclude: Option<EntryId>) -> Result<ScheduleEntry>
where
    W: ScheduleWriter + ?Sized,
{
    if let ConflictResult::Conflict(conflict) = check_conflict(&*tx, &draft, exclude)? {
        let err = ConflictError::describe(&*tx, conflict)?;
        warn!(
            axis = err.axis.as_str(),
            resource = %err.resource,
            existing = %err.existing.id,
            "booking rejected"
        );
        return Err(err.into());
    }
    let entry = match exclude {
        Some(id) => tx.update(id, draft)?,
        None => tx.insert(draft)?,
    };
    Ok(entry)
}
