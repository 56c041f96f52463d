use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Student;

pub const DEFAULT_SIGN_IN: &str = "08:00";
pub const DEFAULT_SIGN_OUT: &str = "15:30";

/// The whole dashboard takes attendance against a single fixed subject.
pub const DEFAULT_SUBJECT_ID: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            "Late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
        }
    }
}

/// One per roster member per session. Absent locks the time fields for
/// editing but never clears their stored values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: String,
    pub sign_in: String,
    pub sign_out: String,
    pub picked_by: String,
}

impl AttendanceRecord {
    fn defaulted(student_id: i64) -> Self {
        AttendanceRecord {
            student_id,
            status: AttendanceStatus::Present,
            notes: String::new(),
            sign_in: DEFAULT_SIGN_IN.to_string(),
            sign_out: DEFAULT_SIGN_OUT.to_string(),
            picked_by: String::new(),
        }
    }

    pub fn times_editable(&self) -> bool {
        self.status != AttendanceStatus::Absent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceField {
    Status,
    Notes,
    SignIn,
    SignOut,
    PickedBy,
}

impl AttendanceField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "status" => Some(AttendanceField::Status),
            "notes" => Some(AttendanceField::Notes),
            "signIn" => Some(AttendanceField::SignIn),
            "signOut" => Some(AttendanceField::SignOut),
            "pickedBy" => Some(AttendanceField::PickedBy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

impl AttendanceSummary {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late
    }
}

/// Flat row of the bulk save payload, stamped with the session identifiers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub class_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub notes: String,
    pub sign_in: String,
    pub sign_out: String,
    pub picked_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    UnknownStudent(i64),
    BadStatus(String),
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::UnknownStudent(id) => write!(f, "no draft record for student {}", id),
            DraftError::BadStatus(s) => {
                write!(f, "status must be Present, Absent or Late, got {:?}", s)
            }
        }
    }
}

/// Locally held, unpersisted attendance edits for one (class, date) session.
///
/// The mapping is keyed by student id and kept in roster order so the bulk
/// payload comes out the way the table is displayed. Nothing here touches the
/// network; the handler layer decides when to load a roster and when to save.
#[derive(Debug, Default)]
pub struct AttendanceDraft {
    records: IndexMap<i64, AttendanceRecord>,
    dirty: bool,
}

impl AttendanceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole mapping with freshly defaulted records, one per
    /// roster member. The swap is atomic: the new map is built first.
    pub fn load_roster(&mut self, roster: &[Student]) {
        let mut records = IndexMap::with_capacity(roster.len());
        for s in roster {
            records.insert(s.id, AttendanceRecord::defaulted(s.id));
        }
        self.records = records;
        self.dirty = false;
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.dirty = false;
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Unsaved edits exist. Set by `set_field`, cleared by roster loads and
    /// by a successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn record(&self, student_id: i64) -> Option<&AttendanceRecord> {
        self.records.get(&student_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.records.values()
    }

    /// Updates exactly one field of exactly one record. A status flip to
    /// Absent leaves the stored sign-in/sign-out values alone.
    pub fn set_field(
        &mut self,
        student_id: i64,
        field: AttendanceField,
        value: &str,
    ) -> Result<(), DraftError> {
        let rec = self
            .records
            .get_mut(&student_id)
            .ok_or(DraftError::UnknownStudent(student_id))?;
        match field {
            AttendanceField::Status => {
                rec.status = AttendanceStatus::parse(value)
                    .ok_or_else(|| DraftError::BadStatus(value.to_string()))?;
            }
            AttendanceField::Notes => rec.notes = value.to_string(),
            AttendanceField::SignIn => rec.sign_in = value.to_string(),
            AttendanceField::SignOut => rec.sign_out = value.to_string(),
            AttendanceField::PickedBy => rec.picked_by = value.to_string(),
        }
        self.dirty = true;
        Ok(())
    }

    pub fn summarize(&self) -> AttendanceSummary {
        let mut summary = AttendanceSummary::default();
        for rec in self.records.values() {
            match rec.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
            }
        }
        summary
    }

    /// Materializes the mapping into the bulk save payload, one flat entry
    /// per record in roster order.
    pub fn build_submission(
        &self,
        class_id: i64,
        subject_id: i64,
        date: NaiveDate,
    ) -> Vec<AttendanceEntry> {
        self.records
            .values()
            .map(|rec| AttendanceEntry {
                class_id,
                subject_id,
                date,
                student_id: rec.student_id,
                status: rec.status,
                notes: rec.notes.clone(),
                sign_in: rec.sign_in.clone(),
                sign_out: rec.sign_out.clone(),
                picked_by: rec.picked_by.clone(),
            })
            .collect()
    }
}
