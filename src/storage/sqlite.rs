//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags, params, OptionalExtension};
use crate::{Result, Error};
use crate::student::{NewStudent, Student, StudentId};
use super::{schema, DeleteOutcome, StudentGateway, UpdateOutcome};

const STUDENT_COLUMNS: &str = "id, name, email, address, phone_number";

/// SQLite-backed storage for student records
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn)
    }

    /// Open an existing database file without write access.
    ///
    /// Fails instead of creating the file when it is missing.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Internal("database connection lock poisoned".to_string()))
    }

    /// Count all students
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Current concurrency token for a record, `None` when absent
    pub fn version_of(&self, id: StudentId) -> Result<Option<i64>> {
        let conn = self.conn()?;
        Self::read_version(&conn, id)
    }

    /// Replace a record only if it still carries `expected_version`.
    ///
    /// Returns `Conflict` when no row matched the id/version pair; the caller
    /// decides whether that means the row vanished or was modified.
    pub fn replace_at_version(
        &self,
        id: StudentId,
        student: &Student,
        expected_version: i64,
    ) -> Result<UpdateOutcome> {
        Self::check_id(id, student)?;
        let conn = self.conn()?;
        Self::write_versioned(&conn, student, expected_version)
    }

    fn check_id(id: StudentId, student: &Student) -> Result<()> {
        if student.id != id {
            return Err(Error::IdMismatch { path: id, body: student.id });
        }
        Ok(())
    }

    fn read_version(conn: &Connection, id: StudentId) -> Result<Option<i64>> {
        conn.query_row("SELECT version FROM students WHERE id = ?1", [id], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    fn write_versioned(conn: &Connection, student: &Student, expected_version: i64) -> Result<UpdateOutcome> {
        let changed = conn.execute(
            r#"
            UPDATE students
            SET name = ?1, email = ?2, address = ?3, phone_number = ?4, version = version + 1
            WHERE id = ?5 AND version = ?6
            "#,
            params![
                student.name,
                student.email,
                student.address,
                student.phone_number,
                student.id,
                expected_version,
            ],
        )?;

        if changed == 0 {
            tracing::debug!("Stale write for student {} at version {}", student.id, expected_version);
            return Ok(UpdateOutcome::Conflict);
        }

        tracing::debug!("Updated student {} to version {}", student.id, expected_version + 1);
        Ok(UpdateOutcome::Updated(student.clone()))
    }

    /// Helper to convert a row to a Student
    fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<Student> {
        Ok(Student {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            address: row.get(3)?,
            phone_number: row.get(4)?,
        })
    }
}

impl StudentGateway for SqliteStore {
    fn list_all(&self) -> Result<Vec<Student>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM students ORDER BY id", STUDENT_COLUMNS))?;

        let students = stmt
            .query_map([], Self::row_to_student)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(students)
    }

    fn get_by_id(&self, id: StudentId) -> Result<Option<Student>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS),
            [id],
            Self::row_to_student,
        )
        .optional()
        .map_err(Into::into)
    }

    fn insert(&self, student: &NewStudent) -> Result<Student> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO students (name, email, address, phone_number)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![student.name, student.email, student.address, student.phone_number],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Inserted student {}", id);
        Ok(student.clone().into_student(id))
    }

    fn update(&self, id: StudentId, student: &Student) -> Result<UpdateOutcome> {
        Self::check_id(id, student)?;
        let conn = self.conn()?;

        let Some(version) = Self::read_version(&conn, id)? else {
            return Ok(UpdateOutcome::NotFound);
        };
        Self::write_versioned(&conn, student, version)
    }

    fn delete_by_id(&self, id: StudentId) -> Result<DeleteOutcome> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM students WHERE id = ?1", [id])?;

        if changed == 0 {
            return Ok(DeleteOutcome::NotFound);
        }
        tracing::debug!("Deleted student {}", id);
        Ok(DeleteOutcome::Deleted)
    }
}
