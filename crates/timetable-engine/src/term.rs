//! Academic term resolution.

use crate::builder::Field;
use crate::error::{Result, ValidationError};
use crate::model::AcademicTerm;
use crate::repository::{RepositoryResult, ScheduleRepository, ScheduleWriter};

/// Trim a year label, rejecting blank ones.
pub fn normalize_label(label: &str) -> std::result::Result<&str, ValidationError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(vec![Field::AcademicYear]));
    }
    Ok(trimmed)
}

/// Resolve `label` to its term, creating one when absent.
///
/// Runs in its own transaction, so concurrent callers with the same label
/// always observe a single term.
pub fn resolve_term<R: ScheduleRepository>(repo: &R, label: &str) -> Result<AcademicTerm> {
    let label = normalize_label(label)?;
    repo.with_transaction(|tx| Ok(resolve_in(tx, label)?))
}

/// Resolve inside an already open transaction.
pub fn resolve_in<W>(tx: &mut W, label: &str) -> RepositoryResult<AcademicTerm>
where
    W: ScheduleWriter + ?Sized,
{
    tx.upsert_term(label.trim())
}
