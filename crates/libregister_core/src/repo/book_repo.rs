//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the canonical `books` store.
//! - Own the transactional clear-and-reload primitive used by restore.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `BookRecord::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `list_books` ordering is ascending accession number, always.

use crate::db::DbError;
use crate::model::book::{BookRecord, BookValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    accession_no,
    entry_date,
    class_no,
    book_name,
    publisher,
    publish_date,
    pages,
    price,
    medium,
    withdraw_date,
    notes,
    student_name,
    student_class,
    borrow_date,
    return_date
FROM books";

const BOOK_COLUMNS: &[&str] = &[
    "accession_no",
    "entry_date",
    "class_no",
    "book_name",
    "publisher",
    "publish_date",
    "pages",
    "price",
    "medium",
    "withdraw_date",
    "notes",
    "student_name",
    "student_class",
    "borrow_date",
    "return_date",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    /// `create_book` was asked to insert a key that already exists.
    DuplicateKey(String),
    InvalidData(String),
    /// The connection has not gone through `open_db` migration bootstrap.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey(key) => {
                write!(f, "accession number `{key}` already exists in the register")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open via db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListQuery {
    /// Maximum rows to return; unlimited when `None`.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Atomicity policy for [`BookRepository::replace_all`].
///
/// The register historically kept whatever rows had loaded before a bad
/// record was hit; both behaviors are supported and the caller must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Any per-record failure rolls the whole replacement back.
    Atomic,
    /// Per-record failures are collected; prior inserts are kept.
    BestEffort,
}

/// Per-record failure recorded by a best-effort [`BookRepository::replace_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreFailure {
    pub accession_no: String,
    pub reason: String,
}

/// Outcome of a completed [`BookRepository::replace_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of records now present in the store.
    pub inserted: usize,
    /// Records that could not be loaded (best-effort mode only).
    pub failed: Vec<RestoreFailure>,
}

impl RestoreReport {
    /// Returns whether every candidate record made it into the store.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Repository interface for register CRUD and bulk-replace operations.
pub trait BookRepository {
    /// Inserts a new record; fails with [`RepoError::DuplicateKey`] when the
    /// accession number is already registered. The store is unchanged on
    /// failure.
    fn create_book(&self, book: &BookRecord) -> RepoResult<()>;
    /// Inserts or fully replaces the record with the same accession number.
    fn upsert_book(&self, book: &BookRecord) -> RepoResult<()>;
    /// Fetches one record; absence is `Ok(None)`, never an error.
    fn get_book(&self, accession_no: &str) -> RepoResult<Option<BookRecord>>;
    /// Removes the record if present. Deleting an absent key is a no-op
    /// success; the return value tells whether a row was removed.
    fn delete_book(&self, accession_no: &str) -> RepoResult<bool>;
    /// Lists records in ascending accession-number order. Every call opens
    /// an independent pass over the engine's ordered cursor.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<BookRecord>>;
    /// Clears the store and loads `books` with create semantics inside one
    /// transaction. Atomicity of per-record failures follows `mode`.
    fn replace_all(&mut self, books: &[BookRecord], mode: RestoreMode)
        -> RepoResult<RestoreReport>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &BookRecord) -> RepoResult<()> {
        insert_book(self.conn, book)
    }

    fn upsert_book(&self, book: &BookRecord) -> RepoResult<()> {
        book.validate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO books (
                accession_no,
                entry_date,
                class_no,
                book_name,
                publisher,
                publish_date,
                pages,
                price,
                medium,
                withdraw_date,
                notes,
                student_name,
                student_class,
                borrow_date,
                return_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                book.accession_no,
                book.entry_date,
                book.class_no,
                book.book_name,
                book.publisher,
                book.publish_date,
                book.pages,
                book.price,
                book.medium,
                book.withdraw_date,
                book.notes,
                book.student_name,
                book.student_class,
                book.borrow_date,
                book.return_date,
            ],
        )?;

        Ok(())
    }

    fn get_book(&self, accession_no: &str) -> RepoResult<Option<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE accession_no = ?1;"))?;

        let mut rows = stmt.query([accession_no])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }

        Ok(None)
    }

    fn delete_book(&self, accession_no: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE accession_no = ?1;", [accession_no])?;

        Ok(changed > 0)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<BookRecord>> {
        let mut sql = format!("{BOOK_SELECT_SQL} ORDER BY accession_no ASC");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn replace_all(
        &mut self,
        books: &[BookRecord],
        mode: RestoreMode,
    ) -> RepoResult<RestoreReport> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM books;", [])?;

        let mut report = RestoreReport::default();
        for book in books {
            match insert_book(&tx, book) {
                Ok(()) => report.inserted += 1,
                // Dropping the transaction without commit rolls everything
                // back, leaving the pre-restore store intact.
                Err(err) if mode == RestoreMode::Atomic => return Err(err),
                Err(err) => report.failed.push(RestoreFailure {
                    accession_no: book.accession_no.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        tx.commit()?;
        Ok(report)
    }
}

fn insert_book(conn: &Connection, book: &BookRecord) -> RepoResult<()> {
    book.validate()?;

    let inserted = conn.execute(
        "INSERT INTO books (
            accession_no,
            entry_date,
            class_no,
            book_name,
            publisher,
            publish_date,
            pages,
            price,
            medium,
            withdraw_date,
            notes,
            student_name,
            student_class,
            borrow_date,
            return_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
        params![
            book.accession_no,
            book.entry_date,
            book.class_no,
            book.book_name,
            book.publisher,
            book.publish_date,
            book.pages,
            book.price,
            book.medium,
            book.withdraw_date,
            book.notes,
            book.student_name,
            book.student_class,
            book.borrow_date,
            book.return_date,
        ],
    );

    match inserted {
        Ok(_) => Ok(()),
        Err(err) if is_key_conflict(&err) => {
            Err(RepoError::DuplicateKey(book.accession_no.clone()))
        }
        Err(err) => Err(err.into()),
    }
}

fn is_key_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<BookRecord> {
    let book = BookRecord {
        accession_no: row.get("accession_no")?,
        entry_date: row.get("entry_date")?,
        class_no: row.get("class_no")?,
        book_name: row.get("book_name")?,
        publisher: row.get("publisher")?,
        publish_date: row.get("publish_date")?,
        pages: row.get("pages")?,
        price: row.get("price")?,
        medium: row.get("medium")?,
        withdraw_date: row.get("withdraw_date")?,
        notes: row.get("notes")?,
        student_name: row.get("student_name")?,
        student_class: row.get("student_class")?,
        borrow_date: row.get("borrow_date")?,
        return_date: row.get("return_date")?,
    };
    book.validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))?;
    Ok(book)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "books")? {
        return Err(RepoError::MissingRequiredTable("books"));
    }

    for &column in BOOK_COLUMNS {
        if !table_has_column(conn, "books", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "books",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
