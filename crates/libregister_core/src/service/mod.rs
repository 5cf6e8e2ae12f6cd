//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, search and backup calls into use-case APIs.
//! - Keep UI layers decoupled from storage details.

pub mod book_service;
