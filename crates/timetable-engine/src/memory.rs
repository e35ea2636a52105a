//! In-memory schedule repository.
//!
//! All rows live in a [`MemoryStore`] behind a `parking_lot::RwLock`. A
//! transaction takes the write lock, runs against a clone of the store and swaps
//! the clone in only on success, so a failed or rejected booking leaves no trace.
//! The store can be saved to and loaded from a JSON snapshot file.
//!
//! Several processes may share one snapshot file. Each must hold a [`StoreLock`]
//! from before it loads the file until after it saves it, otherwise one process
//! can check against rows another is about to overwrite.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::RepositoryError;
use crate::model::{
    AcademicTerm, Axis, AxisQuery, EntryFilter, EntryId, ResourceRef, ScheduleDraft,
    ScheduleEntry, TermId,
};
use crate::repository::{RepositoryResult, ScheduleReader, ScheduleRepository, ScheduleWriter};

fn first_id() -> u64 {
    1
}

/// Display name registered for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLabel {
    pub axis: Axis,
    pub resource: ResourceRef,
    pub label: String,
}

/// Plain-data contents of a [`MemoryRepository`]; also its snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    entries: Vec<ScheduleEntry>,
    #[serde(default)]
    terms: Vec<AcademicTerm>,
    #[serde(default)]
    labels: Vec<ResourceLabel>,
    #[serde(default = "first_id")]
    next_entry_id: u64,
    #[serde(default = "first_id")]
    next_term_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            entries: Vec::new(),
            terms: Vec::new(),
            labels: Vec::new(),
            next_entry_id: first_id(),
            next_term_id: first_id(),
        }
    }
}

impl MemoryStore {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn terms(&self) -> &[AcademicTerm] {
        &self.terms
    }

    pub fn set_label(&mut self, axis: Axis, resource: ResourceRef, label: String) {
        match self
            .labels
            .iter_mut()
            .find(|l| l.axis == axis && l.resource == resource)
        {
            Some(existing) => existing.label = label,
            None => self.labels.push(ResourceLabel {
                axis,
                resource,
                label,
            }),
        }
    }

    /// Storage-level uniqueness: reject a write whose slot overlaps a stored row
    /// on any axis, independent of what the caller checked.
    fn ensure_slot_free(
        &self,
        draft: &ScheduleDraft,
        exclude: Option<EntryId>,
    ) -> RepositoryResult<()> {
        for axis in Axis::PRIORITY {
            let query = AxisQuery::for_draft(axis, draft, exclude);
            if let Some(taken) = self
                .entries
                .iter()
                .find(|e| query.matches(e) && e.occupies(draft.time_start, draft.time_end))
            {
                return Err(RepositoryError::SlotTaken {
                    axis,
                    existing: taken.id,
                });
            }
        }
        Ok(())
    }

    fn ensure_term(&self, id: TermId) -> RepositoryResult<()> {
        if self.terms.iter().any(|t| t.id == id) {
            Ok(())
        } else {
            Err(RepositoryError::MissingTerm(id))
        }
    }

    /// Check a store read from disk and move its id counters past every stored id.
    fn validated(mut self) -> RepositoryResult<Self> {
        let invalid = |reason: String| Err(RepositoryError::InvalidSnapshot(reason));

        let mut term_ids = HashSet::new();
        let mut term_labels = HashSet::new();
        for term in &self.terms {
            if !term_ids.insert(term.id) {
                return invalid(format!("duplicate term id {}", term.id));
            }
            if !term_labels.insert(term.label.as_str()) {
                return invalid(format!("duplicate term label '{}'", term.label));
            }
        }

        let mut entry_ids = HashSet::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if !entry_ids.insert(entry.id) {
                return invalid(format!("duplicate entry id {}", entry.id));
            }
            if entry.time_end <= entry.time_start {
                return invalid(format!(
                    "entry {} ends at {} before it starts at {}",
                    entry.id, entry.time_end, entry.time_start
                ));
            }
            if !term_ids.contains(&entry.term) {
                return invalid(format!(
                    "entry {} refers to unknown term {}",
                    entry.id, entry.term
                ));
            }
            for earlier in &self.entries[..i] {
                if let Some(axis) = clash(earlier, entry) {
                    return invalid(format!(
                        "entries {} and {} overlap on {}",
                        earlier.id, entry.id, axis
                    ));
                }
            }
        }

        let after_entries = self.entries.iter().map(|e| e.id.0 + 1).max().unwrap_or(1);
        let after_terms = self.terms.iter().map(|t| t.id.0 + 1).max().unwrap_or(1);
        self.next_entry_id = self.next_entry_id.max(after_entries);
        self.next_term_id = self.next_term_id.max(after_terms);
        Ok(self)
    }
}

/// First axis on which two stored rows double-book a resource.
fn clash(a: &ScheduleEntry, b: &ScheduleEntry) -> Option<Axis> {
    if a.day != b.day || a.term != b.term || a.semester != b.semester {
        return None;
    }
    if !a.occupies(b.time_start, b.time_end) {
        return None;
    }
    Axis::PRIORITY
        .into_iter()
        .find(|&axis| a.axis_ref(axis) == b.axis_ref(axis))
}

impl ScheduleReader for MemoryStore {
    fn find_by_axis(&self, query: &AxisQuery) -> RepositoryResult<Vec<ScheduleEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn get(&self, id: EntryId) -> RepositoryResult<Option<ScheduleEntry>> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }

    fn list(&self, filter: &EntryFilter) -> RepositoryResult<Vec<ScheduleEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    fn find_term(&self, label: &str) -> RepositoryResult<Option<AcademicTerm>> {
        Ok(self.terms.iter().find(|t| t.label == label).cloned())
    }

    fn term(&self, id: TermId) -> RepositoryResult<Option<AcademicTerm>> {
        Ok(self.terms.iter().find(|t| t.id == id).cloned())
    }

    fn resource_label(
        &self,
        axis: Axis,
        resource: &ResourceRef,
    ) -> RepositoryResult<Option<String>> {
        Ok(self
            .labels
            .iter()
            .find(|l| l.axis == axis && &l.resource == resource)
            .map(|l| l.label.clone()))
    }
}

impl ScheduleWriter for MemoryStore {
    fn insert(&mut self, draft: ScheduleDraft) -> RepositoryResult<ScheduleEntry> {
        self.ensure_term(draft.term)?;
        self.ensure_slot_free(&draft, None)?;
        let id = EntryId(self.next_entry_id);
        self.next_entry_id += 1;
        let entry = ScheduleEntry::new(id, draft);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    fn update(&mut self, id: EntryId, draft: ScheduleDraft) -> RepositoryResult<ScheduleEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(RepositoryError::MissingEntry(id))?;
        self.ensure_term(draft.term)?;
        self.ensure_slot_free(&draft, Some(id))?;
        let entry = ScheduleEntry::new(id, draft);
        self.entries[position] = entry.clone();
        Ok(entry)
    }

    fn delete(&mut self, id: EntryId) -> RepositoryResult<Option<ScheduleEntry>> {
        let position = self.entries.iter().position(|e| e.id == id);
        Ok(position.map(|i| self.entries.remove(i)))
    }

    fn upsert_term(&mut self, label: &str) -> RepositoryResult<AcademicTerm> {
        if let Some(term) = self.terms.iter().find(|t| t.label == label) {
            return Ok(term.clone());
        }
        let term = AcademicTerm {
            id: TermId(self.next_term_id),
            label: label.to_string(),
        };
        self.next_term_id += 1;
        self.terms.push(term.clone());
        debug!(term = %term.id, label, "created academic term");
        Ok(term)
    }
}

/// Thread-safe in-memory repository.
///
/// ```
/// use timetable_engine::memory::MemoryRepository;
/// use timetable_engine::repository::{ScheduleRepository, ScheduleWriter};
/// use timetable_engine::RepositoryError;
///
/// let repo = MemoryRepository::new();
/// let term = repo
///     .with_transaction(|tx| tx.upsert_term("2024-2025"))
///     .unwrap();
/// let again = repo
///     .with_transaction(|tx| Ok::<_, RepositoryError>(tx.upsert_term("2024-2025")?.id))
///     .unwrap();
/// assert_eq!(term.id, again);
/// ```
#[derive(Debug)]
pub struct MemoryRepository {
    store: RwLock<MemoryStore>,
    available: AtomicBool,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::from_store(MemoryStore::default())
    }

    pub fn from_store(store: MemoryStore) -> Self {
        MemoryRepository {
            store: RwLock::new(store),
            available: AtomicBool::new(true),
        }
    }

    /// Load a snapshot written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = serde_json::from_str::<MemoryStore>(&content)?.validated()?;
        debug!(path = %path.display(), entries = store.entries.len(), "loaded snapshot");
        Ok(Self::from_store(store))
    }

    /// Load `path` if it exists, otherwise start empty.
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the current contents to `path`, through a temp file in the same
    /// directory that is renamed over it.
    pub fn save(&self, path: impl AsRef<Path>) -> RepositoryResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&*self.store.read())?;
        let io_err = |source: io::Error| RepositoryError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        info!(path = %path.display(), "saved snapshot");
        Ok(())
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> MemoryStore {
        self.store.read().clone()
    }

    pub fn len(&self) -> usize {
        self.store.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a display name for a resource.
    pub fn register_label(
        &self,
        axis: Axis,
        resource: impl Into<ResourceRef>,
        label: impl Into<String>,
    ) {
        self.store
            .write()
            .set_label(axis, resource.into(), label.into());
    }

    /// Simulate an outage: while unavailable every transaction and snapshot fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Storage("repository unavailable".to_string()))
        }
    }
}

impl ScheduleRepository for MemoryRepository {
    type Txn = MemoryStore;
    type View = MemoryStore;

    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self::Txn) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.check_available()?;
        let mut guard = self.store.write();
        let mut working = guard.clone();
        let out = f(&mut working)?;
        *guard = working;
        Ok(out)
    }

    fn with_snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self::View) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.check_available()?;
        let guard = self.store.read();
        f(&*guard)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Advisory lock on a snapshot file, released on drop.
///
/// The lock is taken on a `<store>.lock` file next to the snapshot, so it stays
/// valid while [`MemoryRepository::save`] replaces the snapshot itself.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Block until no other holder has the store locked, then lock it for
    /// exclusive use.
    pub fn exclusive(store: impl AsRef<Path>) -> RepositoryResult<Self> {
        Self::acquire(store.as_ref(), true)
    }

    /// Block until no exclusive holder remains, then lock the store for reading.
    pub fn shared(store: impl AsRef<Path>) -> RepositoryResult<Self> {
        Self::acquire(store.as_ref(), false)
    }

    fn acquire(store: &Path, exclusive: bool) -> RepositoryResult<Self> {
        let mut name = store.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);

        let io_err = |source: io::Error| RepositoryError::Io {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_err)?;
        if exclusive {
            FileExt::lock_exclusive(&file).map_err(io_err)?;
        } else {
            FileExt::lock_shared(&file).map_err(io_err)?;
        }
        debug!(path = %path.display(), exclusive, "store locked");
        Ok(StoreLock { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Closing the file releases the lock as well; unlock now so waiters wake
        // before the handle is freed.
        let _ = FileExt::unlock(&self.file);
    }
}
