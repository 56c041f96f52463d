pub mod attendance;
pub mod classes;
pub mod core;
pub mod grades;
pub mod reports;
pub mod schedule;
pub mod students;
pub mod teachers;
