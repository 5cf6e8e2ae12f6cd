//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the register.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `BookRecord::validate()` before
//!   persistence.
//! - Repository APIs return semantic results (typed duplicate-key errors,
//!   `Option` absence) in addition to DB transport errors.

pub mod book_repo;
