//! Case-insensitive substring search over register records.
//!
//! # Responsibility
//! - Filter repository iteration by accession number, title and borrower.
//! - Preserve repository ordering in results.
//!
//! # Invariants
//! - Search is read-only; it never mutates the store.
//! - An empty term matches every record (it is a substring of everything).

use crate::model::book::BookRecord;
use crate::repo::book_repo::{BookListQuery, BookRepository, RepoResult};

/// Filters the full register down to records whose accession number, title,
/// or borrower name contains `term` case-insensitively.
///
/// Results keep the ascending accession-number order of
/// [`BookRepository::list_books`].
pub fn search_books<R: BookRepository>(repo: &R, term: &str) -> RepoResult<Vec<BookRecord>> {
    let needle = term.to_lowercase();
    let books = repo.list_books(&BookListQuery::default())?;

    Ok(books
        .into_iter()
        .filter(|book| matches_term(book, &needle))
        .collect())
}

fn matches_term(book: &BookRecord, needle: &str) -> bool {
    contains_ci(&book.accession_no, needle)
        || contains_ci(&book.book_name, needle)
        || book
            .student_name
            .as_deref()
            .is_some_and(|name| contains_ci(name, needle))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
