use serde::{Deserialize, Serialize};

/// Teaching staff row as the dashboard holds it: the backend's nested
/// `user`/`department`/`role` objects flattened into one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub department_id: i64,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
}

/// `GET /teachers` returns the roster plus both reference lists in one payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeachersPayload {
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub departments: Vec<Department>,
}

/// Read-only copy of a backend student. `student_no` is the school-issued
/// identifier string, distinct from the numeric row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    #[serde(rename = "studentId")]
    pub student_no: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub class_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub teacher: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: i64,
    pub day: String,
    pub time: String,
    pub subject: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub room: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub student_name: String,
    pub subject: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub grade: String,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub teacher: String,
}
