//! Request body validation
//!
//! Bodies are checked here, explicitly, before any storage call. Every
//! problem found is reported, not just the first one.

use crate::student::{NewStudent, Student, StudentId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single problem with one field of a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// The body did not match the student shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field: field.into(),
                message: message.into(),
            }],
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| format!("{} {}", issue.field, issue.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Check a create body. The id is assigned by the store, so it must be
/// absent (or the placeholder `0`).
pub fn new_student(body: &[u8]) -> Result<NewStudent, ValidationError> {
    let map = parse_object(body)?;
    let mut fields = Fields::new(&map);

    match fields.id() {
        None | Some(0) => {}
        Some(_) => fields.issue("id", "is assigned by the server and must be omitted"),
    }
    let name = fields.required_string("name");
    let email = fields.optional_string("email");
    let address = fields.optional_string("address");
    let phone_number = fields.optional_string("phoneNumber");

    fields.finish()?;
    Ok(NewStudent {
        name: name.unwrap_or_default(),
        email,
        address,
        phone_number,
    })
}

/// Check an update body. The full record is replaced, so the id is required.
pub fn student(body: &[u8]) -> Result<Student, ValidationError> {
    let map = parse_object(body)?;
    let mut fields = Fields::new(&map);

    let id = fields.id();
    if id.is_none() && !fields.has_issue("id") {
        fields.issue("id", "is required");
    }
    let name = fields.required_string("name");
    let email = fields.optional_string("email");
    let address = fields.optional_string("address");
    let phone_number = fields.optional_string("phoneNumber");

    fields.finish()?;
    Ok(Student {
        id: id.unwrap_or_default(),
        name: name.unwrap_or_default(),
        email,
        address,
        phone_number,
    })
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::single("body", format!("is not valid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::single("body", "must be a JSON object")),
    }
}

/// Collects issues while pulling typed fields out of a JSON object
struct Fields<'a> {
    map: &'a Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl<'a> Fields<'a> {
    fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            issues: Vec::new(),
        }
    }

    fn issue(&mut self, field: &str, message: &str) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    fn id(&mut self) -> Option<StudentId> {
        match self.map.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => match n.as_i64() {
                Some(id) => Some(id),
                None => {
                    self.issue("id", "must be an integer");
                    None
                }
            },
            Some(_) => {
                self.issue("id", "must be an integer");
                None
            }
        }
    }

    fn required_string(&mut self, field: &str) -> Option<String> {
        match self.map.get(field) {
            None | Some(Value::Null) => {
                self.issue(field, "is required");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.issue(field, "must not be empty");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(field, "must be a string");
                None
            }
        }
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        match self.map.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.issue(field, "must be a string");
                None
            }
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}
