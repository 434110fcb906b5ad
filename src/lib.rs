//! # Rollbook - Student Records Service
//!
//! A small CRUD service over a single table of student records.
//!
//! Rollbook provides:
//! - A `Student` record type and its JSON shape
//! - Explicit request-body validation ahead of any storage call
//! - A persistence gateway trait with a SQLite-backed implementation
//! - An axum HTTP surface for list/get/create/update/delete
//! - A terminal display client that reads the student list over HTTP

pub mod student;
pub mod validate;
pub mod storage;
pub mod server;
pub mod client;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use student::{NewStudent, Student, StudentId};
pub use client::StudentClient;
pub use storage::{DeleteOutcome, SqliteStore, StudentGateway, UpdateOutcome};
pub use validate::{FieldIssue, ValidationError};

/// Result type alias for Rollbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Rollbook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Student not found: {0}")]
    NotFound(StudentId),

    #[error("Invalid student: {0}")]
    Validation(#[from] ValidationError),

    #[error("Student ID mismatch: path {path}, body {body}")]
    IdMismatch { path: StudentId, body: StudentId },

    #[error("Student {0} was modified concurrently, retry the request")]
    Conflict(StudentId),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
