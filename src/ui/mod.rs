//! Terminal output for the CLI and the `list` display client

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, render_students, student_list, success};
pub use table::students_table;
pub use theme::{theme, Theme};
