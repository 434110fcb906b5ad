//! Database schema definitions

/// SQL to create the students table.
///
/// `version` is the optimistic concurrency token; it starts at 1 and is
/// bumped by every successful update. AUTOINCREMENT keeps deleted ids from
/// being handed out again.
pub const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    address TEXT,
    phone_number TEXT,
    version INTEGER NOT NULL DEFAULT 1
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_students_name ON students(name)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_STUDENTS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
