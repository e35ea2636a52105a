//! Storage contract for schedule entries and academic terms.
//!
//! The engine never touches storage directly. It reads through [`ScheduleReader`],
//! writes through [`ScheduleWriter`], and obtains both from a
//! [`ScheduleRepository`], which is responsible for making a check-then-write
//! sequence atomic.
//!
//! # Transactions
//!
//! [`ScheduleRepository::with_transaction`] hands the closure exclusive access to
//! the store. Implementations must commit the closure's writes only when it
//! returns `Ok`, and must prevent any other transaction from observing or
//! modifying the rows the closure read until it finishes. A relational adapter
//! would map this onto a serializable transaction; [`MemoryRepository`] holds a
//! write lock and commits a working copy.
//!
//! [`MemoryRepository`]: crate::memory::MemoryRepository

use crate::error::RepositoryError;
use crate::model::{
    AcademicTerm, Axis, AxisQuery, EntryFilter, EntryId, ResourceRef, ScheduleDraft,
    ScheduleEntry, TermId,
};

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Read access to schedule entries and terms.
pub trait ScheduleReader {
    /// Entries sharing the query's resource on its day, term and semester,
    /// minus `query.exclude`.
    fn find_by_axis(&self, query: &AxisQuery) -> RepositoryResult<Vec<ScheduleEntry>>;

    fn get(&self, id: EntryId) -> RepositoryResult<Option<ScheduleEntry>>;

    /// Entries accepted by `filter`, in ascending id order.
    fn list(&self, filter: &EntryFilter) -> RepositoryResult<Vec<ScheduleEntry>>;

    /// Exact-label term lookup.
    fn find_term(&self, label: &str) -> RepositoryResult<Option<AcademicTerm>>;

    fn term(&self, id: TermId) -> RepositoryResult<Option<AcademicTerm>>;

    /// Human-readable name for a resource, used in conflict messages.
    fn resource_label(
        &self,
        _axis: Axis,
        _resource: &ResourceRef,
    ) -> RepositoryResult<Option<String>> {
        Ok(None)
    }
}

/// Write access, available only inside a transaction.
pub trait ScheduleWriter: ScheduleReader {
    /// Store a new entry and assign its id.
    fn insert(&mut self, draft: ScheduleDraft) -> RepositoryResult<ScheduleEntry>;

    /// Replace the entry `id`, keeping its id.
    ///
    /// # Errors
    /// [`RepositoryError::MissingEntry`] when `id` is not stored.
    fn update(&mut self, id: EntryId, draft: ScheduleDraft) -> RepositoryResult<ScheduleEntry>;

    /// Remove the entry `id`, returning it if it existed.
    fn delete(&mut self, id: EntryId) -> RepositoryResult<Option<ScheduleEntry>>;

    /// Return the term labelled `label`, creating it if absent.
    fn upsert_term(&mut self, label: &str) -> RepositoryResult<AcademicTerm>;
}

/// A store that can run atomic read-then-write units.
pub trait ScheduleRepository: Send + Sync {
    /// What a transaction closure writes through.
    type Txn: ScheduleWriter + ?Sized;

    /// What a snapshot closure reads through.
    type View: ScheduleReader + ?Sized;

    /// Run `f` with exclusive access; commit its writes only if it returns `Ok`.
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Txn) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Run `f` against a consistent read-only view.
    fn with_snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self::View) -> Result<T, E>,
        E: From<RepositoryError>;
}
