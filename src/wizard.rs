use std::collections::BTreeMap;

use serde::Serialize;

pub const WEEKLY_SUBJECTS: [&str; 4] = ["Maths", "Physics", "Chemistry", "Biology"];

pub const END_OF_TERM_SUBJECTS: [&str; 10] = [
    "English I",
    "English II",
    "Maths I",
    "Maths II",
    "Physics I",
    "Physics II",
    "Chemistry I",
    "Chemistry II",
    "Biology I",
    "Biology II",
];

/// Canonical subject key. Entries are keyed by this slug rather than the
/// display name so a typo in a caller-supplied name cannot silently create a
/// second entry ("English I" -> "english-i").
pub fn subject_slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    Weekly,
    EndOfTerm,
}

impl ReportType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weekly" => Some(ReportType::Weekly),
            "end-of-term" => Some(ReportType::EndOfTerm),
            _ => None,
        }
    }

    pub fn subjects(self) -> &'static [&'static str] {
        match self {
            ReportType::Weekly => &WEEKLY_SUBJECTS,
            ReportType::EndOfTerm => &END_OF_TERM_SUBJECTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    TypeSelect,
    SubjectDetails,
    AdditionalInfo,
}

impl WizardStep {
    pub fn index(self) -> usize {
        match self {
            WizardStep::TypeSelect => 0,
            WizardStep::SubjectDetails => 1,
            WizardStep::AdditionalInfo => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEntry {
    pub attendance: String,
    pub punctuality: String,
    pub engagement: String,
    #[serde(rename = "cw")]
    pub classwork: String,
    #[serde(rename = "hw")]
    pub homework: String,
    pub total_score: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfTermEntry {
    pub total_marks: String,
    pub obtained_marks: String,
    pub overall_obtained: String,
    pub percentage: String,
    pub grade: String,
    pub attitude_to_learning: String,
    pub classwork_effort: String,
    pub assessment_results: String,
    pub progress: String,
    pub predicted_grade: String,
    pub comments: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeeklyField {
    Attendance,
    Punctuality,
    Engagement,
    Classwork,
    Homework,
    TotalScore,
}

impl WeeklyField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "attendance" => Some(WeeklyField::Attendance),
            "punctuality" => Some(WeeklyField::Punctuality),
            "engagement" => Some(WeeklyField::Engagement),
            "cw" => Some(WeeklyField::Classwork),
            "hw" => Some(WeeklyField::Homework),
            "totalScore" => Some(WeeklyField::TotalScore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfTermField {
    TotalMarks,
    ObtainedMarks,
    OverallObtained,
    Percentage,
    Grade,
    AttitudeToLearning,
    ClassworkEffort,
    AssessmentResults,
    Progress,
    PredictedGrade,
    Comments,
}

impl EndOfTermField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "totalMarks" => Some(EndOfTermField::TotalMarks),
            "obtainedMarks" => Some(EndOfTermField::ObtainedMarks),
            "overallObtained" => Some(EndOfTermField::OverallObtained),
            "percentage" => Some(EndOfTermField::Percentage),
            "grade" => Some(EndOfTermField::Grade),
            "attitudeToLearning" => Some(EndOfTermField::AttitudeToLearning),
            "classworkEffort" => Some(EndOfTermField::ClassworkEffort),
            "assessmentResults" => Some(EndOfTermField::AssessmentResults),
            "progress" => Some(EndOfTermField::Progress),
            "predictedGrade" => Some(EndOfTermField::PredictedGrade),
            "comments" => Some(EndOfTermField::Comments),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySubjectReport {
    pub subject_id: String,
    pub subject: String,
    #[serde(flatten)]
    pub entry: WeeklyEntry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOfTermSubjectReport {
    pub subject_id: String,
    pub subject: String,
    #[serde(flatten)]
    pub entry: EndOfTermEntry,
}

/// The finished payload handed to the submission collaborator. The two
/// schemas are mutually exclusive variants; they are never merged.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reportType", rename_all = "kebab-case")]
pub enum ReportSubmission {
    #[serde(rename_all = "camelCase")]
    Weekly {
        subjects: Vec<WeeklySubjectReport>,
        overall_remarks: String,
        targets_improvements: String,
    },
    #[serde(rename_all = "camelCase")]
    EndOfTerm {
        subjects: Vec<EndOfTermSubjectReport>,
        general_comments: String,
        exam_targets: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    TypeNotChosen,
    WrongStep { expected: WizardStep },
    AtFirstStep,
    AtLastStep,
    UnknownSubject(String),
    UnknownField(String),
    BadFieldValue { field: &'static str, value: String },
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::TypeNotChosen => write!(f, "select a report type first"),
            WizardError::WrongStep { expected } => {
                write!(f, "action only valid on step {}", expected.index())
            }
            WizardError::AtFirstStep => write!(f, "already on the first step"),
            WizardError::AtLastStep => write!(f, "already on the last step"),
            WizardError::UnknownSubject(s) => {
                write!(f, "{:?} is not a subject of this report type", s)
            }
            WizardError::UnknownField(s) => {
                write!(f, "{:?} is not a field of this report type", s)
            }
            WizardError::BadFieldValue { field, value } => {
                write!(f, "invalid value {:?} for {}", value, field)
            }
        }
    }
}

/// Linear three-step report builder. One in-flight report at a time; submit
/// is terminal and the handler swaps in a fresh wizard afterwards.
///
/// Subject entries are sparse: a subject appears in the map only once one of
/// its fields has been touched. Stepping back never clears entered data.
#[derive(Debug, Default)]
pub struct ReportWizard {
    step: usize,
    report_type: Option<ReportType>,
    weekly: BTreeMap<String, WeeklyEntry>,
    end_of_term: BTreeMap<String, EndOfTermEntry>,
    overall_remarks: String,
    targets_improvements: String,
    general_comments: String,
    exam_targets: String,
}

const LAST_STEP: usize = 2;

impl ReportWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        match self.step {
            0 => WizardStep::TypeSelect,
            1 => WizardStep::SubjectDetails,
            _ => WizardStep::AdditionalInfo,
        }
    }

    pub fn report_type(&self) -> Option<ReportType> {
        self.report_type
    }

    /// Only valid while on the type-select step; choosing a type advances to
    /// the subject-details step. Going Previous back to step 0 allows a
    /// re-pick; data already entered under either type is kept.
    pub fn select_type(&mut self, rt: ReportType) -> Result<(), WizardError> {
        if self.step != 0 {
            return Err(WizardError::WrongStep {
                expected: WizardStep::TypeSelect,
            });
        }
        self.report_type = Some(rt);
        self.step = 1;
        Ok(())
    }

    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        if self.report_type.is_none() {
            return Err(WizardError::TypeNotChosen);
        }
        if self.step >= LAST_STEP {
            return Err(WizardError::AtLastStep);
        }
        self.step += 1;
        Ok(self.step())
    }

    /// Previous only decrements; entered data is never cleared.
    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        if self.step == 0 {
            return Err(WizardError::AtFirstStep);
        }
        self.step -= 1;
        Ok(self.step())
    }

    fn active_type(&self) -> Result<ReportType, WizardError> {
        self.report_type.ok_or(WizardError::TypeNotChosen)
    }

    /// Resolves a display name against the active type's subject list.
    fn resolve_subject(&self, subject: &str) -> Result<(String, String), WizardError> {
        let rt = self.active_type()?;
        let slug = subject_slug(subject);
        for name in rt.subjects() {
            if subject_slug(name) == slug {
                return Ok((slug, name.to_string()));
            }
        }
        Err(WizardError::UnknownSubject(subject.to_string()))
    }

    /// Updates one field of one subject entry, creating the entry on first
    /// touch. Only valid on the subject-details step.
    pub fn set_subject_field(
        &mut self,
        subject: &str,
        field: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        if self.step != 1 {
            return Err(WizardError::WrongStep {
                expected: WizardStep::SubjectDetails,
            });
        }
        let (slug, _) = self.resolve_subject(subject)?;
        match self.active_type()? {
            ReportType::Weekly => {
                let f = WeeklyField::parse(field)
                    .ok_or_else(|| WizardError::UnknownField(field.to_string()))?;
                match f {
                    WeeklyField::Attendance if !matches!(value, "present" | "absent") => {
                        return Err(WizardError::BadFieldValue {
                            field: "attendance",
                            value: value.to_string(),
                        });
                    }
                    WeeklyField::Punctuality if !matches!(value, "on-time" | "late") => {
                        return Err(WizardError::BadFieldValue {
                            field: "punctuality",
                            value: value.to_string(),
                        });
                    }
                    _ => {}
                }
                let entry = self.weekly.entry(slug).or_default();
                match f {
                    WeeklyField::Attendance => entry.attendance = value.to_string(),
                    WeeklyField::Punctuality => entry.punctuality = value.to_string(),
                    WeeklyField::Engagement => entry.engagement = value.to_string(),
                    WeeklyField::Classwork => entry.classwork = value.to_string(),
                    WeeklyField::Homework => entry.homework = value.to_string(),
                    WeeklyField::TotalScore => entry.total_score = value.to_string(),
                }
            }
            ReportType::EndOfTerm => {
                let f = EndOfTermField::parse(field)
                    .ok_or_else(|| WizardError::UnknownField(field.to_string()))?;
                let entry = self.end_of_term.entry(slug).or_default();
                match f {
                    EndOfTermField::TotalMarks => entry.total_marks = value.to_string(),
                    EndOfTermField::ObtainedMarks => entry.obtained_marks = value.to_string(),
                    EndOfTermField::OverallObtained => entry.overall_obtained = value.to_string(),
                    EndOfTermField::Percentage => entry.percentage = value.to_string(),
                    EndOfTermField::Grade => entry.grade = value.to_string(),
                    EndOfTermField::AttitudeToLearning => {
                        entry.attitude_to_learning = value.to_string()
                    }
                    EndOfTermField::ClassworkEffort => entry.classwork_effort = value.to_string(),
                    EndOfTermField::AssessmentResults => {
                        entry.assessment_results = value.to_string()
                    }
                    EndOfTermField::Progress => entry.progress = value.to_string(),
                    EndOfTermField::PredictedGrade => entry.predicted_grade = value.to_string(),
                    EndOfTermField::Comments => entry.comments = value.to_string(),
                }
            }
        }
        Ok(())
    }

    /// Step-2 free-text fields; the pair branches by report type.
    pub fn set_summary_field(&mut self, field: &str, value: &str) -> Result<(), WizardError> {
        if self.step != LAST_STEP {
            return Err(WizardError::WrongStep {
                expected: WizardStep::AdditionalInfo,
            });
        }
        match (self.active_type()?, field) {
            (ReportType::Weekly, "overallRemarks") => self.overall_remarks = value.to_string(),
            (ReportType::Weekly, "targetsImprovements") => {
                self.targets_improvements = value.to_string()
            }
            (ReportType::EndOfTerm, "generalComments") => self.general_comments = value.to_string(),
            (ReportType::EndOfTerm, "examTargets") => self.exam_targets = value.to_string(),
            _ => return Err(WizardError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    pub fn subject_entry_count(&self) -> usize {
        match self.report_type {
            Some(ReportType::Weekly) => self.weekly.len(),
            Some(ReportType::EndOfTerm) => self.end_of_term.len(),
            None => 0,
        }
    }

    pub fn weekly_entry(&self, subject: &str) -> Option<&WeeklyEntry> {
        self.weekly.get(&subject_slug(subject))
    }

    pub fn end_of_term_entry(&self, subject: &str) -> Option<&EndOfTermEntry> {
        self.end_of_term.get(&subject_slug(subject))
    }

    /// Assembles the complete payload. Only valid on the final step. Touched
    /// subjects are emitted in the fixed subject-list order.
    pub fn build_submission(&self) -> Result<ReportSubmission, WizardError> {
        if self.step != LAST_STEP {
            return Err(WizardError::WrongStep {
                expected: WizardStep::AdditionalInfo,
            });
        }
        match self.active_type()? {
            ReportType::Weekly => {
                let subjects = WEEKLY_SUBJECTS
                    .iter()
                    .filter_map(|name| {
                        let slug = subject_slug(name);
                        self.weekly.get(&slug).map(|entry| WeeklySubjectReport {
                            subject_id: slug.clone(),
                            subject: name.to_string(),
                            entry: entry.clone(),
                        })
                    })
                    .collect();
                Ok(ReportSubmission::Weekly {
                    subjects,
                    overall_remarks: self.overall_remarks.clone(),
                    targets_improvements: self.targets_improvements.clone(),
                })
            }
            ReportType::EndOfTerm => {
                let subjects = END_OF_TERM_SUBJECTS
                    .iter()
                    .filter_map(|name| {
                        let slug = subject_slug(name);
                        self.end_of_term
                            .get(&slug)
                            .map(|entry| EndOfTermSubjectReport {
                                subject_id: slug.clone(),
                                subject: name.to_string(),
                                entry: entry.clone(),
                            })
                    })
                    .collect();
                Ok(ReportSubmission::EndOfTerm {
                    subjects,
                    general_comments: self.general_comments.clone(),
                    exam_targets: self.exam_targets.clone(),
                })
            }
        }
    }
}
