use crate::student::Student;
use crate::ui::{students_table, theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().title.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().accent.clone()),
        label.style(theme().label.clone()),
        value
    );
}

fn faint(text: &str) -> String {
    text.style(theme().faint.clone()).to_string()
}

fn total_line(count: usize) -> String {
    match count {
        1 => "1 student".to_string(),
        n => format!("{} students", n),
    }
}

/// Table of students followed by a total, or a notice when there are none
pub fn render_students(students: &[Student]) -> String {
    if students.is_empty() {
        return faint("No students yet.");
    }
    format!("{}\n{}", students_table(students), faint(&total_line(students.len())))
}

/// The `list` display: a titled section naming where the rows came from
pub fn student_list(source: &str, students: &[Student]) {
    println!();
    println!(
        "━{} Students━ {}",
        Icons::PERSON,
        source.style(theme().label.clone())
    );
    println!("{}", render_students(students));
}
