use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::attendance::AttendanceEntry;
use crate::model::{
    ClassInfo, Department, Grade, Role, ScheduleItem, Student, Teacher, TeachersPayload,
};
use crate::wizard::ReportSubmission;

/// Resource-client failure taxonomy: transport, backend rejection (status +
/// human-readable message), or an unreadable body. All of them surface to the
/// user as a retryable notification; none are fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("could not read response: {0}")]
    BadResponse(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Editor payloads (validated upstream, serialized as mutation bodies)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub designation: String,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub department_id: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
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
pub struct ClassPayload {
    pub name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub teacher: String,
}

// ---------------------------------------------------------------------------
// Wire shapes of the consumed teachers endpoint
// ---------------------------------------------------------------------------

// The backend nests user/role/department objects; the dashboard flattens
// them into `Teacher` on receipt.

#[derive(Debug, Deserialize)]
struct RoleWire {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DepartmentWire {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    role: Option<RoleWire>,
}

#[derive(Debug, Deserialize)]
struct TeacherWire {
    id: i64,
    #[serde(default)]
    designation: String,
    user: UserWire,
    department: Option<DepartmentWire>,
}

#[derive(Debug, Deserialize)]
struct TeachersPayloadWire {
    teachers: Vec<TeacherWire>,
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default)]
    departments: Vec<Department>,
}

fn flatten_teacher(w: TeacherWire) -> Teacher {
    Teacher {
        id: w.id,
        name: w.user.name,
        email: w.user.email,
        phone: w.user.phone,
        designation: w.designation,
        department_id: w.department.as_ref().map(|d| d.id).unwrap_or(0),
        department: w.department.map(|d| d.name).unwrap_or_default(),
        role_id: w.user.role.as_ref().map(|r| r.id).unwrap_or(0),
        role: w.user.role.map(|r| r.name).unwrap_or_default(),
        address: w.user.address,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// HTTP backend
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(HttpBackend {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx responses are expected to carry a `message` field, which is
    /// surfaced verbatim in the failure notification.
    fn read<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> ApiResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("backend returned status {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<T>()
            .map_err(|e| ApiError::BadResponse(e.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!(path, "GET");
        Self::read(self.client.get(self.url(path)).send()?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        debug!(path, "POST");
        Self::read(self.client.post(self.url(path)).json(body).send()?)
    }

    fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        debug!(path, "PUT");
        Self::read(self.client.put(self.url(path)).json(body).send()?)
    }
}

#[derive(Debug, Serialize)]
struct IdBody {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct SavedCount {
    #[serde(default)]
    saved: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Acknowledged {
    #[serde(default)]
    success: bool,
}

// ---------------------------------------------------------------------------
// Mock backend: the simplified deployment's static JSON resources, held in
// memory. Mutations are synchronous-success stand-ins; ids are assigned
// locally. Callers still treat every operation as fallible.
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MockBackend {
    teachers: Vec<Teacher>,
    roles: Vec<Role>,
    departments: Vec<Department>,
    students: Vec<Student>,
    classes: Vec<ClassInfo>,
    schedule: Vec<ScheduleItem>,
    grades: Vec<Grade>,
    next_id: i64,
}

#[derive(Debug, Deserialize)]
struct TeachersFixture {
    teachers: Vec<Teacher>,
    roles: Vec<Role>,
    departments: Vec<Department>,
}

impl MockBackend {
    pub fn seeded() -> ApiResult<Self> {
        let tf: TeachersFixture = Self::fixture(include_str!("../mock/teachers.json"))?;
        let students: Vec<Student> = Self::fixture(include_str!("../mock/students.json"))?;
        let classes: Vec<ClassInfo> = Self::fixture(include_str!("../mock/classes.json"))?;
        let schedule: Vec<ScheduleItem> = Self::fixture(include_str!("../mock/schedule.json"))?;
        let grades: Vec<Grade> = Self::fixture(include_str!("../mock/grades.json"))?;
        let mut next_id = 1000;
        for t in &tf.teachers {
            next_id = next_id.max(t.id + 1);
        }
        for s in &students {
            next_id = next_id.max(s.id + 1);
        }
        Ok(MockBackend {
            teachers: tf.teachers,
            roles: tf.roles,
            departments: tf.departments,
            students,
            classes,
            schedule,
            grades,
            next_id,
        })
    }

    fn fixture<T: DeserializeOwned>(raw: &str) -> ApiResult<T> {
        serde_json::from_str(raw).map_err(|e| ApiError::BadResponse(e.to_string()))
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn teacher_from_payload(&self, id: i64, p: &TeacherPayload) -> Teacher {
        Teacher {
            id,
            name: p.name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            designation: p.designation.clone(),
            department_id: p.department_id,
            department: self
                .departments
                .iter()
                .find(|d| d.id == p.department_id)
                .map(|d| d.name.clone())
                .unwrap_or_default(),
            role_id: p.role_id,
            role: self
                .roles
                .iter()
                .find(|r| r.id == p.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            address: p.address.clone(),
        }
    }

    fn student_from_payload(id: i64, p: &StudentPayload) -> Student {
        Student {
            id,
            name: p.name.clone(),
            student_no: p.student_no.clone(),
            grade: p.grade.clone(),
            section: p.section.clone(),
            roll_number: p.roll_number.clone(),
            class_id: p.class_id,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiClient: one client, two deployments
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ApiClient {
    Mock(MockBackend),
    Http(HttpBackend),
}

impl ApiClient {
    pub fn mock() -> ApiResult<Self> {
        Ok(ApiClient::Mock(MockBackend::seeded()?))
    }

    pub fn http(base_url: &str) -> ApiResult<Self> {
        Ok(ApiClient::Http(HttpBackend::new(base_url)?))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            ApiClient::Mock(_) => "mock",
            ApiClient::Http(_) => "http",
        }
    }

    // -- teachers ----------------------------------------------------------

    pub fn teachers_list(&self) -> ApiResult<TeachersPayload> {
        match self {
            ApiClient::Mock(m) => Ok(TeachersPayload {
                teachers: m.teachers.clone(),
                roles: m.roles.clone(),
                departments: m.departments.clone(),
            }),
            ApiClient::Http(h) => {
                let wire: TeachersPayloadWire = h.get("/teachers")?;
                Ok(TeachersPayload {
                    teachers: wire.teachers.into_iter().map(flatten_teacher).collect(),
                    roles: wire.roles,
                    departments: wire.departments,
                })
            }
        }
    }

    /// Full list fetch plus client-side lookup; collections are small and
    /// the backend offers no filtered query.
    pub fn teacher_by_id(&self, id: i64) -> ApiResult<Teacher> {
        self.teachers_list()?
            .teachers
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ApiError::NotFound("teacher"))
    }

    pub fn teachers_create(&mut self, payload: &TeacherPayload) -> ApiResult<Teacher> {
        match self {
            ApiClient::Mock(m) => {
                let id = m.take_id();
                let teacher = m.teacher_from_payload(id, payload);
                m.teachers.push(teacher.clone());
                Ok(teacher)
            }
            ApiClient::Http(h) => {
                let wire: TeacherWire = h.post("/teachers/add", payload)?;
                Ok(flatten_teacher(wire))
            }
        }
    }

    pub fn teachers_update(&mut self, id: i64, payload: &TeacherPayload) -> ApiResult<Teacher> {
        match self {
            ApiClient::Mock(m) => {
                let teacher = m.teacher_from_payload(id, payload);
                let slot = m
                    .teachers
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(ApiError::NotFound("teacher"))?;
                *slot = teacher.clone();
                Ok(teacher)
            }
            ApiClient::Http(h) => {
                #[derive(Serialize)]
                struct UpdateBody<'a> {
                    id: i64,
                    #[serde(flatten)]
                    payload: &'a TeacherPayload,
                }
                let wire: TeacherWire = h.put("/teachers/update", &UpdateBody { id, payload })?;
                Ok(flatten_teacher(wire))
            }
        }
    }

    /// Delete takes the identifier in the request body, not the URL path.
    /// The existing backend contract works that way; preserved as-is.
    pub fn teachers_delete(&mut self, id: i64) -> ApiResult<()> {
        match self {
            ApiClient::Mock(m) => {
                let before = m.teachers.len();
                m.teachers.retain(|t| t.id != id);
                if m.teachers.len() == before {
                    return Err(ApiError::NotFound("teacher"));
                }
                Ok(())
            }
            ApiClient::Http(h) => {
                let _: Acknowledged = h.post("/teachers/delete", &IdBody { id })?;
                Ok(())
            }
        }
    }

    // -- students ----------------------------------------------------------

    pub fn students_list(&self) -> ApiResult<Vec<Student>> {
        match self {
            ApiClient::Mock(m) => Ok(m.students.clone()),
            ApiClient::Http(h) => h.get("/students"),
        }
    }

    /// The roster for one class, filtered client-side from the full list.
    pub fn students_for_class(&self, class_id: i64) -> ApiResult<Vec<Student>> {
        Ok(self
            .students_list()?
            .into_iter()
            .filter(|s| s.class_id == class_id)
            .collect())
    }

    pub fn students_create(&mut self, payload: &StudentPayload) -> ApiResult<Student> {
        match self {
            ApiClient::Mock(m) => {
                let id = m.take_id();
                let student = MockBackend::student_from_payload(id, payload);
                m.students.push(student.clone());
                Ok(student)
            }
            ApiClient::Http(h) => h.post("/students/add", payload),
        }
    }

    pub fn students_update(&mut self, id: i64, payload: &StudentPayload) -> ApiResult<Student> {
        match self {
            ApiClient::Mock(m) => {
                let student = MockBackend::student_from_payload(id, payload);
                let slot = m
                    .students
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(ApiError::NotFound("student"))?;
                *slot = student.clone();
                Ok(student)
            }
            ApiClient::Http(h) => {
                #[derive(Serialize)]
                struct UpdateBody<'a> {
                    id: i64,
                    #[serde(flatten)]
                    payload: &'a StudentPayload,
                }
                h.put("/students/update", &UpdateBody { id, payload })
            }
        }
    }

    pub fn students_delete(&mut self, id: i64) -> ApiResult<()> {
        match self {
            ApiClient::Mock(m) => {
                let before = m.students.len();
                m.students.retain(|s| s.id != id);
                if m.students.len() == before {
                    return Err(ApiError::NotFound("student"));
                }
                Ok(())
            }
            ApiClient::Http(h) => {
                let _: Acknowledged = h.post("/students/delete", &IdBody { id })?;
                Ok(())
            }
        }
    }

    // -- classes -----------------------------------------------------------

    pub fn classes_list(&self) -> ApiResult<Vec<ClassInfo>> {
        match self {
            ApiClient::Mock(m) => Ok(m.classes.clone()),
            ApiClient::Http(h) => h.get("/classes"),
        }
    }

    pub fn classes_create(&mut self, payload: &ClassPayload) -> ApiResult<ClassInfo> {
        match self {
            ApiClient::Mock(m) => {
                let class = ClassInfo {
                    id: m.take_id(),
                    name: payload.name.clone(),
                    section: payload.section.clone(),
                    teacher: payload.teacher.clone(),
                };
                m.classes.push(class.clone());
                Ok(class)
            }
            ApiClient::Http(h) => h.post("/classes/add", payload),
        }
    }

    pub fn classes_update(&mut self, id: i64, payload: &ClassPayload) -> ApiResult<ClassInfo> {
        match self {
            ApiClient::Mock(m) => {
                let class = ClassInfo {
                    id,
                    name: payload.name.clone(),
                    section: payload.section.clone(),
                    teacher: payload.teacher.clone(),
                };
                let slot = m
                    .classes
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(ApiError::NotFound("class"))?;
                *slot = class.clone();
                Ok(class)
            }
            ApiClient::Http(h) => {
                #[derive(Serialize)]
                struct UpdateBody<'a> {
                    id: i64,
                    #[serde(flatten)]
                    payload: &'a ClassPayload,
                }
                h.put("/classes/update", &UpdateBody { id, payload })
            }
        }
    }

    pub fn classes_delete(&mut self, id: i64) -> ApiResult<()> {
        match self {
            ApiClient::Mock(m) => {
                let before = m.classes.len();
                m.classes.retain(|c| c.id != id);
                if m.classes.len() == before {
                    return Err(ApiError::NotFound("class"));
                }
                Ok(())
            }
            ApiClient::Http(h) => {
                let _: Acknowledged = h.post("/classes/delete", &IdBody { id })?;
                Ok(())
            }
        }
    }

    // -- schedule / grades -------------------------------------------------

    pub fn schedule_list(&self) -> ApiResult<Vec<ScheduleItem>> {
        match self {
            ApiClient::Mock(m) => Ok(m.schedule.clone()),
            ApiClient::Http(h) => h.get("/schedule"),
        }
    }

    pub fn grades_list(&self) -> ApiResult<Vec<Grade>> {
        match self {
            ApiClient::Mock(m) => Ok(m.grades.clone()),
            ApiClient::Http(h) => h.get("/grades"),
        }
    }

    pub fn grades_for_student(&self, student_id: i64) -> ApiResult<Vec<Grade>> {
        Ok(self
            .grades_list()?
            .into_iter()
            .filter(|g| g.student_id == student_id)
            .collect())
    }

    // -- bulk submissions --------------------------------------------------

    /// Saves one attendance session as a bulk array. Returns the number of
    /// records the backend accepted.
    pub fn attendance_save_bulk(&mut self, entries: &[AttendanceEntry]) -> ApiResult<usize> {
        match self {
            ApiClient::Mock(_) => Ok(entries.len()),
            ApiClient::Http(h) => {
                let resp: SavedCount = h.post("/attendance/bulk", &entries)?;
                Ok(if resp.saved > 0 { resp.saved } else { entries.len() })
            }
        }
    }

    pub fn reports_submit(&mut self, report: &ReportSubmission) -> ApiResult<()> {
        match self {
            ApiClient::Mock(_) => Ok(()),
            ApiClient::Http(h) => {
                let _: Acknowledged = h.post("/reports", report)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_seeds_from_fixtures() {
        let api = ApiClient::mock().expect("seed mock");
        let payload = api.teachers_list().expect("list");
        assert!(!payload.teachers.is_empty());
        assert!(!payload.roles.is_empty());
        assert!(!payload.departments.is_empty());
        assert!(!api.students_list().expect("students").is_empty());
        assert!(!api.classes_list().expect("classes").is_empty());
    }

    #[test]
    fn mock_crud_assigns_ids_and_resolves_references() {
        let mut api = ApiClient::mock().expect("seed mock");
        let dept = api.teachers_list().expect("list").departments[0].clone();
        let role = api.teachers_list().expect("list").roles[0].clone();
        let created = api
            .teachers_create(&TeacherPayload {
                name: "New Teacher".to_string(),
                email: "new@school.edu".to_string(),
                phone: String::new(),
                designation: "Lecturer".to_string(),
                role_id: role.id,
                department_id: dept.id,
                address: String::new(),
                password: String::new(),
            })
            .expect("create");
        assert_eq!(created.department, dept.name);
        assert_eq!(created.role, role.name);
        let fetched = api.teacher_by_id(created.id).expect("get by id");
        assert_eq!(fetched.name, "New Teacher");
        api.teachers_delete(created.id).expect("delete");
        assert!(matches!(
            api.teacher_by_id(created.id),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn roster_filter_is_client_side() {
        let api = ApiClient::mock().expect("seed mock");
        let all = api.students_list().expect("students");
        let class1 = api.students_for_class(1).expect("roster");
        assert!(class1.len() < all.len());
        assert!(class1.iter().all(|s| s.class_id == 1));
    }
}
