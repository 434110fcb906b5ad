//! Student records
//!
//! `Student` is the stored record. `NewStudent` is the same attribute set
//! before the gateway has assigned an id.

use serde::{Deserialize, Serialize};

/// Row identifier assigned by the store
pub type StudentId = i64;

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Unique identifier, assigned on insert
    pub id: StudentId,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// A student that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl NewStudent {
    /// Create a new student with only the required fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            address: None,
            phone_number: None,
        }
    }

    /// Attach the id the store assigned
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            address: self.address,
            phone_number: self.phone_number,
        }
    }
}
