use crate::student::{Student, StudentId};
use tabled::{settings::Style, Table, Tabled};

const EMPTY_CELL: &str = "-";

#[derive(Tabled)]
pub struct StudentRow {
    #[tabled(rename = "ID")]
    pub id: StudentId,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Phone")]
    pub phone_number: String,
}

impl From<&Student> for StudentRow {
    fn from(student: &Student) -> Self {
        let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| EMPTY_CELL.to_string());
        Self {
            id: student.id,
            name: student.name.clone(),
            email: cell(&student.email),
            address: cell(&student.address),
            phone_number: cell(&student.phone_number),
        }
    }
}

/// Render students as a rounded table; empty input renders nothing
pub fn students_table(students: &[Student]) -> String {
    if students.is_empty() {
        return String::new();
    }

    let rows: Vec<StudentRow> = students.iter().map(StudentRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::NewStudent;

    #[test]
    fn test_empty_list_renders_nothing() {
        assert_eq!(students_table(&[]), "");
    }

    #[test]
    fn test_table_has_headers_and_placeholders() {
        let students = vec![
            NewStudent {
                email: Some("ana@school.test".to_string()),
                ..NewStudent::new("Ana")
            }
            .into_student(1),
            NewStudent::new("Bo").into_student(2),
        ];
        let table = students_table(&students);

        assert!(table.contains("Name"));
        assert!(table.contains("ana@school.test"));
        assert!(table.contains("Bo"));
        assert!(table.lines().any(|line| line.contains("Bo") && line.contains(EMPTY_CELL)));
    }
}
