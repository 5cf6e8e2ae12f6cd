//! Register use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for register callers (forms, tooling).
//! - Carry the create-vs-update dispatch for acquisition form submissions.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Edit state is cleared on both success and failure of a save.

use crate::backup::json::{export_all, restore, BackupResult};
use crate::model::book::BookRecord;
use crate::repo::book_repo::{
    BookListQuery, BookRepository, RepoResult, RestoreMode, RestoreReport,
};
use crate::search::substring::search_books;

/// Caller-owned marker for the record currently being edited.
///
/// Replaces the register's historical process-wide mutable slot: each caller
/// threads its own state through [`BookService::save_record`], which clears
/// it no matter how the save ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditState {
    editing: Option<String>,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `accession_no` as the record under edit.
    pub fn begin(&mut self, accession_no: impl Into<String>) {
        self.editing = Some(accession_no.into());
    }

    /// Returns the key of the record under edit, if any.
    pub fn editing_key(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn clear(&mut self) {
        self.editing = None;
    }
}

/// Use-case service wrapper around a book repository.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new acquisition record.
    pub fn create_book(&self, book: &BookRecord) -> RepoResult<()> {
        self.repo.create_book(book)
    }

    /// Inserts or fully replaces the record with the same accession number.
    pub fn upsert_book(&self, book: &BookRecord) -> RepoResult<()> {
        self.repo.upsert_book(book)
    }

    /// Gets one record by accession number.
    pub fn get_book(&self, accession_no: &str) -> RepoResult<Option<BookRecord>> {
        self.repo.get_book(accession_no)
    }

    /// Deletes one record; deleting an absent key is a no-op success.
    pub fn delete_book(&self, accession_no: &str) -> RepoResult<bool> {
        self.repo.delete_book(accession_no)
    }

    /// Lists records in ascending accession-number order.
    pub fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<BookRecord>> {
        self.repo.list_books(query)
    }

    /// Substring search over accession number, title and borrower name.
    pub fn search_books(&self, term: &str) -> RepoResult<Vec<BookRecord>> {
        search_books(&self.repo, term)
    }

    /// Serializes the whole register into one backup document.
    pub fn export_backup(&self) -> BackupResult<String> {
        export_all(&self.repo)
    }

    /// Replaces the register's contents from a backup document.
    pub fn restore_backup(
        &mut self,
        document: &str,
        mode: RestoreMode,
    ) -> BackupResult<RestoreReport> {
        restore(&mut self.repo, document, mode)
    }

    /// Loads a record for editing and marks it in `state`.
    ///
    /// Absent keys leave `state` unchanged and return `Ok(None)`.
    pub fn begin_edit(
        &self,
        state: &mut EditState,
        accession_no: &str,
    ) -> RepoResult<Option<BookRecord>> {
        let book = self.repo.get_book(accession_no)?;
        if book.is_some() {
            state.begin(accession_no);
        }
        Ok(book)
    }

    /// Saves a submitted acquisition form.
    ///
    /// Dispatches to `upsert_book` when `state` marks an edit in progress
    /// and to `create_book` otherwise. `state` is cleared before returning,
    /// on success and on failure alike.
    pub fn save_record(&self, state: &mut EditState, book: &BookRecord) -> RepoResult<()> {
        let editing = state.is_editing();
        state.clear();

        if editing {
            self.repo.upsert_book(book)
        } else {
            self.repo.create_book(book)
        }
    }
}
