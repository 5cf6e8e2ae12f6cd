//! Whole-register backup and restore entry points.
//!
//! # Responsibility
//! - Serialize the full record set into a portable document.
//! - Validate external documents and replace store contents atomically.
//!
//! # Invariants
//! - Export output is deterministic for a given store state.
//! - Restore never touches the store before its input has parsed.

pub mod json;
