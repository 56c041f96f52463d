use serde_json::json;
use tracing::debug;

use crate::api::TeacherPayload;
use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::model::Teacher;
use crate::screen::EditorState;

fn rows(state: &AppState) -> serde_json::Value {
    let filtered: Vec<&Teacher> = state.teachers.screen.filtered();
    json!({
        "teachers": filtered,
        "total": state.teachers.screen.len(),
        "query": state.teachers.screen.query(),
    })
}

/// Full fetch on open (and on explicit refresh). A failed fetch leaves the
/// screen empty rather than stale.
fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.teachers_list(),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(payload) => {
            state.teachers.screen.set_items(payload.teachers);
            state.teachers.roles = payload.roles;
            state.teachers.departments = payload.departments;
            let mut result = rows(state);
            result["roles"] = json!(state.teachers.roles);
            result["departments"] = json!(state.teachers.departments);
            ok(&req.id, result)
        }
        Err(e) => {
            state.teachers.screen.set_items(Vec::new());
            api_err(&req.id, e)
        }
    }
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = match helpers::required_str(req, "query") {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    state.teachers.screen.set_query(&query);
    ok(&req.id, rows(state))
}

fn handle_editor_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    match req.params.get("teacherId").and_then(|v| v.as_i64()) {
        Some(id) => {
            if !state.teachers.screen.open_editor_edit(id) {
                return err(&req.id, "not_found", "teacher not found", None);
            }
            let editing = match state.teachers.screen.editor() {
                EditorState::Editing(t) => json!(t),
                _ => serde_json::Value::Null,
            };
            ok(&req.id, json!({ "mode": "edit", "teacher": editing }))
        }
        None => {
            state.teachers.screen.open_editor_create();
            ok(&req.id, json!({ "mode": "create", "teacher": null }))
        }
    }
}

fn handle_editor_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.teachers.screen.close_editor();
    ok(&req.id, json!({ "closed": true }))
}

/// Required-field validation, the protocol-side analog of the form's native
/// checks. Field-keyed messages so the shell can mark inputs.
fn validate(p: &TeacherPayload) -> serde_json::Map<String, serde_json::Value> {
    let mut fields = serde_json::Map::new();
    if p.name.trim().is_empty() {
        fields.insert("name".into(), json!("name is required"));
    }
    if p.email.trim().is_empty() {
        fields.insert("email".into(), json!("email is required"));
    } else if !p.email.contains('@') {
        fields.insert("email".into(), json!("email must be an email address"));
    }
    if p.designation.trim().is_empty() {
        fields.insert("designation".into(), json!("designation is required"));
    }
    fields
}

/// The editor emits a validated payload; persistence happens here, through
/// the resource client. On any failure the editor stays open with its state
/// untouched so the user can retry.
fn handle_editor_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let editing_id = match state.teachers.screen.editor() {
        EditorState::Closed => return err(&req.id, "editor_closed", "open the editor first", None),
        EditorState::Creating => None,
        EditorState::Editing(t) => Some(t.id),
    };
    let payload: TeacherPayload = match helpers::payload(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let fields = validate(&payload);
    if !fields.is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "required fields are missing or invalid",
            Some(json!({ "fields": fields })),
        );
    }

    let saved = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        match editing_id {
            Some(id) => api.teachers_update(id, &payload),
            None => api.teachers_create(&payload),
        }
    };
    match saved {
        Ok(teacher) => {
            debug!(teacher_id = teacher.id, "teacher saved");
            let snapshot = json!(teacher);
            state.teachers.screen.apply_saved(teacher);
            ok(&req.id, json!({ "teacher": snapshot }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

/// Delete needs an explicit confirmation flag; the row leaves the local
/// collection only after the backend accepted the delete.
fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match helpers::required_i64(req, "teacherId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !helpers::flag(req, "confirmed") {
        return err(
            &req.id,
            "confirm_required",
            "deleting a teacher needs confirmation",
            None,
        );
    }
    let deleted = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.teachers_delete(id)
    };
    match deleted {
        Ok(()) => {
            state.teachers.screen.remove(id);
            ok(&req.id, json!({ "deleted": id }))
        }
        // Failed delete leaves the row in place.
        Err(e) => api_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.open" | "teachers.refresh" => Some(handle_open(state, req)),
        "teachers.filter" => Some(handle_filter(state, req)),
        "teachers.editorOpen" => Some(handle_editor_open(state, req)),
        "teachers.editorCancel" => Some(handle_editor_cancel(state, req)),
        "teachers.editorSubmit" => Some(handle_editor_submit(state, req)),
        "teachers.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
