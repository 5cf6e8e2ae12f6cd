//! Register search entry points.
//!
//! # Responsibility
//! - Expose substring filtering over repository iteration.
//! - Keep search result shaping inside core.

pub mod substring;
