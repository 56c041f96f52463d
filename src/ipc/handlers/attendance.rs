use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use crate::attendance::{AttendanceField, DEFAULT_SUBJECT_ID};
use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};

fn snapshot(state: &AppState) -> serde_json::Value {
    let scr = &state.attendance;
    let rows: Vec<serde_json::Value> = scr
        .roster
        .iter()
        .filter_map(|student| {
            scr.draft.record(student.id).map(|record| {
                json!({
                    "student": student,
                    "record": record,
                    "timesEditable": record.times_editable(),
                })
            })
        })
        .collect();
    json!({
        "selectedClass": scr.selected_class,
        "selectedDate": scr.selected_date,
        "rows": rows,
        "summary": scr.draft.summarize(),
        "dirty": scr.draft.is_dirty(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, snapshot(state))
}

fn handle_set_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match helpers::required_str(req, "date") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => {
            state.attendance.selected_date = Some(date);
            ok(&req.id, json!({ "selectedDate": date }))
        }
        Err(_) => err(&req.id, "bad_params", "date must be YYYY-MM-DD", None),
    }
}

/// Selecting a class replaces the whole draft with defaulted records for
/// that class's roster. The replace is destructive, so unsaved edits block
/// it unless the caller passes `discardEdits: true` — the discard is never
/// silent.
fn handle_select_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match helpers::required_i64(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if state.attendance.draft.is_dirty() && !helpers::flag(req, "discardEdits") {
        return err(
            &req.id,
            "unsaved_draft",
            "switching class discards unsaved attendance edits",
            Some(json!({ "classId": state.attendance.selected_class })),
        );
    }

    let fetched = {
        let api = match helpers::api(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.classes_list()
            .and_then(|classes| {
                if classes.iter().any(|c| c.id == class_id) {
                    Ok(())
                } else {
                    Err(crate::api::ApiError::NotFound("class"))
                }
            })
            .and_then(|_| api.students_for_class(class_id))
    };
    match fetched {
        Ok(roster) => {
            debug!(class_id, roster = roster.len(), "attendance roster loaded");
            state.attendance.draft.load_roster(&roster);
            state.attendance.roster = roster;
            state.attendance.selected_class = Some(class_id);
            ok(&req.id, snapshot(state))
        }
        // Failed roster fetch leaves the previous selection in place.
        Err(e) => api_err(&req.id, e),
    }
}

fn handle_set_field(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match helpers::required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let field_raw = match helpers::required_str(req, "field") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match helpers::required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(field) = AttendanceField::parse(&field_raw) else {
        return err(
            &req.id,
            "bad_params",
            "field must be status, notes, signIn, signOut or pickedBy",
            None,
        );
    };
    match state.attendance.draft.set_field(student_id, field, &value) {
        Ok(()) => {
            let record = state.attendance.draft.record(student_id);
            ok(
                &req.id,
                json!({
                    "record": record,
                    "timesEditable": record.map(|r| r.times_editable()),
                    "summary": state.attendance.draft.summarize(),
                }),
            )
        }
        Err(e) => err(&req.id, "bad_params", e.to_string(), None),
    }
}

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let summary = state.attendance.draft.summarize();
    ok(
        &req.id,
        json!({ "summary": summary, "rosterSize": state.attendance.draft.len() }),
    )
}

/// Bulk save of the whole session. Missing class or date is a local
/// validation error; no network call is made.
fn handle_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (Some(class_id), Some(date)) = (
        state.attendance.selected_class,
        state.attendance.selected_date,
    ) else {
        return err(
            &req.id,
            "validation_failed",
            "select both class and date before saving",
            None,
        );
    };
    let entries = state
        .attendance
        .draft
        .build_submission(class_id, DEFAULT_SUBJECT_ID, date);

    let saved = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.attendance_save_bulk(&entries)
    };
    match saved {
        Ok(count) => {
            state.attendance.draft.mark_saved();
            ok(
                &req.id,
                json!({ "saved": count, "summary": state.attendance.draft.summarize() }),
            )
        }
        // Failed save keeps the draft (and its dirty flag) for a retry.
        Err(e) => api_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.open" => Some(handle_open(state, req)),
        "attendance.setDate" => Some(handle_set_date(state, req)),
        "attendance.selectClass" => Some(handle_select_class(state, req)),
        "attendance.setField" => Some(handle_set_field(state, req)),
        "attendance.summary" => Some(handle_summary(state, req)),
        "attendance.save" => Some(handle_save(state, req)),
        _ => None,
    }
}
