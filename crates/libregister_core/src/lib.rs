//! Core domain logic for the library acquisition register.
//! This crate is the single source of truth for business invariants.

pub mod backup;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use backup::json::{backup_file_name, export_all, restore, BackupError, BackupResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{BookRecord, BookValidationError};
pub use repo::book_repo::{
    BookListQuery, BookRepository, RepoError, RepoResult, RestoreFailure, RestoreMode,
    RestoreReport, SqliteBookRepository,
};
pub use search::substring::search_books;
pub use service::book_service::{BookService, EditState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
