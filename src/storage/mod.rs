//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - students(id, name, email, address, phone_number, version)
//!
//! The HTTP layer only sees the `StudentGateway` trait; `SqliteStore` is the
//! production implementation.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::Result;
use crate::student::{NewStudent, Student, StudentId};

/// Result of a guarded full-record replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was replaced; carries the stored state
    Updated(Student),
    /// No record with that id exists
    NotFound,
    /// The record changed between the version read and the write
    Conflict,
}

/// Result of a hard delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Durable access to student records.
///
/// Implementations must be safe to share across request handlers.
pub trait StudentGateway: Send + Sync {
    /// Every present record, ordered by id
    fn list_all(&self) -> Result<Vec<Student>>;

    /// Point lookup; `None` when absent
    fn get_by_id(&self, id: StudentId) -> Result<Option<Student>>;

    /// Store a new record under a freshly assigned id
    fn insert(&self, student: &NewStudent) -> Result<Student>;

    /// Replace the whole record. `student.id` must equal `id`.
    fn update(&self, id: StudentId, student: &Student) -> Result<UpdateOutcome>;

    /// Hard removal, no tombstone
    fn delete_by_id(&self, id: StudentId) -> Result<DeleteOutcome>;

    fn exists(&self, id: StudentId) -> Result<bool> {
        Ok(self.get_by_id(id)?.is_some())
    }
}
