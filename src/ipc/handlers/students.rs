use serde_json::json;

use crate::api::StudentPayload;
use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::screen::EditorState;

fn rows(state: &AppState) -> serde_json::Value {
    let filtered: Vec<&Student> = state.students.filtered();
    json!({
        "students": filtered,
        "total": state.students.len(),
        "query": state.students.query(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.students_list(),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(students) => {
            state.students.set_items(students);
            ok(&req.id, rows(state))
        }
        Err(e) => {
            state.students.set_items(Vec::new());
            api_err(&req.id, e)
        }
    }
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = match helpers::required_str(req, "query") {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    state.students.set_query(&query);
    ok(&req.id, rows(state))
}

fn handle_editor_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    match req.params.get("studentId").and_then(|v| v.as_i64()) {
        Some(id) => {
            if !state.students.open_editor_edit(id) {
                return err(&req.id, "not_found", "student not found", None);
            }
            let editing = match state.students.editor() {
                EditorState::Editing(s) => json!(s),
                _ => serde_json::Value::Null,
            };
            ok(&req.id, json!({ "mode": "edit", "student": editing }))
        }
        None => {
            state.students.open_editor_create();
            ok(&req.id, json!({ "mode": "create", "student": null }))
        }
    }
}

fn validate(p: &StudentPayload) -> serde_json::Map<String, serde_json::Value> {
    let mut fields = serde_json::Map::new();
    if p.name.trim().is_empty() {
        fields.insert("name".into(), json!("name is required"));
    }
    if p.student_no.trim().is_empty() {
        fields.insert("studentId".into(), json!("student id is required"));
    }
    if p.class_id <= 0 {
        fields.insert("classId".into(), json!("class is required"));
    }
    fields
}

fn handle_editor_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let editing_id = match state.students.editor() {
        EditorState::Closed => return err(&req.id, "editor_closed", "open the editor first", None),
        EditorState::Creating => None,
        EditorState::Editing(s) => Some(s.id),
    };
    let payload: StudentPayload = match helpers::payload(req) {
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
            Some(id) => api.students_update(id, &payload),
            None => api.students_create(&payload),
        }
    };
    match saved {
        Ok(student) => {
            let snapshot = json!(student);
            state.students.apply_saved(student);
            ok(&req.id, json!({ "student": snapshot }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

fn handle_editor_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.students.close_editor();
    ok(&req.id, json!({ "closed": true }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match helpers::required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !helpers::flag(req, "confirmed") {
        return err(
            &req.id,
            "confirm_required",
            "deleting a student needs confirmation",
            None,
        );
    }
    let deleted = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.students_delete(id)
    };
    match deleted {
        Ok(()) => {
            state.students.remove(id);
            ok(&req.id, json!({ "deleted": id }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.open" | "students.refresh" => Some(handle_open(state, req)),
        "students.filter" => Some(handle_filter(state, req)),
        "students.editorOpen" => Some(handle_editor_open(state, req)),
        "students.editorCancel" => Some(handle_editor_cancel(state, req)),
        "students.editorSubmit" => Some(handle_editor_submit(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
