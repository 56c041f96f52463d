use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::ApiClient;
use crate::attendance::AttendanceDraft;
use crate::model::{ClassInfo, Department, Grade, Role, ScheduleItem, Student, Teacher};
use crate::screen::ListScreen;
use crate::wizard::ReportWizard;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Teachers screen carries the role/department reference lists that arrive
/// in the same backend payload as the roster.
#[derive(Default)]
pub struct TeachersScreen {
    pub screen: ListScreen<Teacher>,
    pub roles: Vec<Role>,
    pub departments: Vec<Department>,
}

/// Attendance screen: the (class, date) session selection plus the draft
/// table. A roster copy is kept so rows can be rendered with student names
/// without refetching.
#[derive(Default)]
pub struct AttendanceScreen {
    pub selected_class: Option<i64>,
    pub selected_date: Option<NaiveDate>,
    pub roster: Vec<Student>,
    pub draft: AttendanceDraft,
}

/// All per-screen state, owned by the stdio loop. Each screen's collection
/// is mutated only by that screen's own handlers; nothing is shared across
/// screens.
pub struct AppState {
    pub api: Option<ApiClient>,
    pub teachers: TeachersScreen,
    pub students: ListScreen<Student>,
    pub classes: ListScreen<ClassInfo>,
    pub schedule: Vec<ScheduleItem>,
    pub grades: ListScreen<Grade>,
    pub attendance: AttendanceScreen,
    pub wizard: ReportWizard,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            api: None,
            teachers: TeachersScreen::default(),
            students: ListScreen::new(),
            classes: ListScreen::new(),
            schedule: Vec::new(),
            grades: ListScreen::new(),
            attendance: AttendanceScreen::default(),
            wizard: ReportWizard::new(),
        }
    }
}
