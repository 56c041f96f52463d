use serde_json::json;
use tracing::info;

use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::wizard::{subject_slug, ReportType, ReportWizard, WizardError};

fn wizard_err(id: &str, e: WizardError) -> serde_json::Value {
    let code = match e {
        WizardError::TypeNotChosen => "type_not_selected",
        WizardError::WrongStep { .. } | WizardError::AtFirstStep | WizardError::AtLastStep => {
            "wrong_step"
        }
        WizardError::UnknownSubject(_)
        | WizardError::UnknownField(_)
        | WizardError::BadFieldValue { .. } => "bad_params",
    };
    err(id, code, e.to_string(), None)
}

fn subjects_json(rt: ReportType) -> Vec<serde_json::Value> {
    rt.subjects()
        .iter()
        .map(|name| json!({ "subjectId": subject_slug(name), "subject": name }))
        .collect()
}

fn snapshot(wizard: &ReportWizard) -> serde_json::Value {
    let step = wizard.step();
    json!({
        "step": step,
        "stepIndex": step.index(),
        "reportType": wizard.report_type(),
        "subjects": wizard.report_type().map(subjects_json),
        "touchedSubjects": wizard.subject_entry_count(),
        "canSubmit": step.index() == 2 && wizard.report_type().is_some(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, snapshot(&state.wizard))
}

fn handle_select_type(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match helpers::required_str(req, "type") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(rt) = ReportType::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "type must be \"weekly\" or \"end-of-term\"",
            None,
        );
    };
    match state.wizard.select_type(rt) {
        Ok(()) => ok(&req.id, snapshot(&state.wizard)),
        Err(e) => wizard_err(&req.id, e),
    }
}

fn handle_subjects(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.wizard.report_type() {
        Some(rt) => ok(&req.id, json!({ "subjects": subjects_json(rt) })),
        None => wizard_err(&req.id, WizardError::TypeNotChosen),
    }
}

fn handle_set_subject_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    let subject = match helpers::required_str(req, "subject") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field = match helpers::required_str(req, "field") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match helpers::required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.wizard.set_subject_field(&subject, &field, &value) {
        Ok(()) => ok(
            &req.id,
            json!({ "touchedSubjects": state.wizard.subject_entry_count() }),
        ),
        Err(e) => wizard_err(&req.id, e),
    }
}

fn handle_set_summary_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    let field = match helpers::required_str(req, "field") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match helpers::required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.wizard.set_summary_field(&field, &value) {
        Ok(()) => ok(&req.id, json!({ "field": field })),
        Err(e) => wizard_err(&req.id, e),
    }
}

fn handle_next(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.wizard.next() {
        Ok(_) => ok(&req.id, snapshot(&state.wizard)),
        Err(e) => wizard_err(&req.id, e),
    }
}

fn handle_previous(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.wizard.previous() {
        Ok(_) => ok(&req.id, snapshot(&state.wizard)),
        Err(e) => wizard_err(&req.id, e),
    }
}

/// Assembles the finished report, hands it to the backend, and swaps in a
/// fresh wizard. Submission is terminal: there is no retry and no draft
/// left behind. A failed submission keeps the in-flight report so the user
/// can resubmit.
fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let report = match state.wizard.build_submission() {
        Ok(r) => r,
        Err(e) => return wizard_err(&req.id, e),
    };
    let sent = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.reports_submit(&report)
    };
    match sent {
        Ok(()) => {
            info!("report submitted");
            let payload = json!(report);
            state.wizard = ReportWizard::new();
            ok(&req.id, json!({ "submitted": true, "report": payload }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.open" => Some(handle_open(state, req)),
        "reports.selectType" => Some(handle_select_type(state, req)),
        "reports.subjects" => Some(handle_subjects(state, req)),
        "reports.setSubjectField" => Some(handle_set_subject_field(state, req)),
        "reports.setSummaryField" => Some(handle_set_summary_field(state, req)),
        "reports.next" => Some(handle_next(state, req)),
        "reports.previous" => Some(handle_previous(state, req)),
        "reports.submit" => Some(handle_submit(state, req)),
        _ => None,
    }
}
