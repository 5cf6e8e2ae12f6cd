//! JSON backup document codec and restore driver.
//!
//! # Responsibility
//! - Export every record, in key order, as one JSON array document.
//! - Parse external documents and load them through the repository's
//!   transactional replace primitive.
//!
//! # Invariants
//! - Every live record appears exactly once in an exported document, field
//!   values passed through unmodified.
//! - A document that fails to parse leaves the store untouched.
//! - Restore writes only through `BookRepository::replace_all`.

use crate::model::book::BookRecord;
use crate::repo::book_repo::{
    BookListQuery, BookRepository, RepoError, RestoreMode, RestoreReport,
};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type BackupResult<T> = Result<T, BackupError>;

/// Backup/restore failure taxonomy.
#[derive(Debug)]
pub enum BackupError {
    /// Restore input is not a JSON array of record-shaped objects.
    Malformed { message: String },
    /// Export could not encode the record set.
    Encode(serde_json::Error),
    Repo(RepoError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed backup document: {message}"),
            Self::Encode(err) => write!(f, "failed to encode backup document: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { .. } => None,
            Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for BackupError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Serializes the whole register into one JSON array document.
///
/// Record order is the repository's ascending key order and field order is
/// fixed by the record type, so identical store states produce
/// byte-identical documents.
pub fn export_all<R: BookRepository>(repo: &R) -> BackupResult<String> {
    let started_at = Instant::now();

    let books = repo.list_books(&BookListQuery::default())?;
    let document = serde_json::to_string(&books).map_err(BackupError::Encode)?;

    info!(
        "event=backup_export module=backup status=ok records={} duration_ms={}",
        books.len(),
        started_at.elapsed().as_millis()
    );
    Ok(document)
}

/// Replaces the register's contents with the records in `document`.
///
/// Phases:
/// 1. Parse `document` into candidate records; failure is
///    [`BackupError::Malformed`] and the store is untouched.
/// 2. Clear and bulk-load through the repository's single-transaction
///    replace primitive. Per-record failures follow `mode`.
pub fn restore<R: BookRepository>(
    repo: &mut R,
    document: &str,
    mode: RestoreMode,
) -> BackupResult<RestoreReport> {
    let started_at = Instant::now();

    let books = parse_document(document).inspect_err(|err| {
        error!(
            "event=backup_restore module=backup status=error error_code=malformed_document error={err}"
        );
    })?;

    let report = match repo.replace_all(&books, mode) {
        Ok(report) => report,
        Err(err) => {
            error!(
                "event=backup_restore module=backup status=error error_code=replace_failed duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    info!(
        "event=backup_restore module=backup status=ok inserted={} failed={} duration_ms={}",
        report.inserted,
        report.failed.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

/// Suggested artifact name for an exported document.
///
/// Where the document is written remains a caller concern; this only fixes
/// the conventional `library_backup_<date>.json` shape.
pub fn backup_file_name(iso_date: &str) -> String {
    format!("library_backup_{iso_date}.json")
}

fn parse_document(document: &str) -> BackupResult<Vec<BookRecord>> {
    serde_json::from_str(document).map_err(|err| BackupError::Malformed {
        message: err.to_string(),
    })
}
