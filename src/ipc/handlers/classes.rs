use serde_json::json;

use crate::api::ClassPayload;
use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::model::ClassInfo;
use crate::screen::EditorState;

fn rows(state: &AppState) -> serde_json::Value {
    let filtered: Vec<&ClassInfo> = state.classes.filtered();
    json!({
        "classes": filtered,
        "total": state.classes.len(),
        "query": state.classes.query(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.classes_list(),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(classes) => {
            state.classes.set_items(classes);
            ok(&req.id, rows(state))
        }
        Err(e) => {
            state.classes.set_items(Vec::new());
            api_err(&req.id, e)
        }
    }
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = match helpers::required_str(req, "query") {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    state.classes.set_query(&query);
    ok(&req.id, rows(state))
}

fn handle_editor_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    match req.params.get("classId").and_then(|v| v.as_i64()) {
        Some(id) => {
            if !state.classes.open_editor_edit(id) {
                return err(&req.id, "not_found", "class not found", None);
            }
            let editing = match state.classes.editor() {
                EditorState::Editing(c) => json!(c),
                _ => serde_json::Value::Null,
            };
            ok(&req.id, json!({ "mode": "edit", "class": editing }))
        }
        None => {
            state.classes.open_editor_create();
            ok(&req.id, json!({ "mode": "create", "class": null }))
        }
    }
}

fn handle_editor_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let editing_id = match state.classes.editor() {
        EditorState::Closed => return err(&req.id, "editor_closed", "open the editor first", None),
        EditorState::Creating => None,
        EditorState::Editing(c) => Some(c.id),
    };
    let payload: ClassPayload = match helpers::payload(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if payload.name.trim().is_empty() {
        return err(
            &req.id,
            "validation_failed",
            "required fields are missing or invalid",
            Some(json!({ "fields": { "name": "name is required" } })),
        );
    }

    let saved = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        match editing_id {
            Some(id) => api.classes_update(id, &payload),
            None => api.classes_create(&payload),
        }
    };
    match saved {
        Ok(class) => {
            let snapshot = json!(class);
            state.classes.apply_saved(class);
            ok(&req.id, json!({ "class": snapshot }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

fn handle_editor_cancel(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.classes.close_editor();
    ok(&req.id, json!({ "closed": true }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match helpers::required_i64(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !helpers::flag(req, "confirmed") {
        return err(
            &req.id,
            "confirm_required",
            "deleting a class needs confirmation",
            None,
        );
    }
    let deleted = {
        let api = match helpers::api_mut(state, req) {
            Ok(api) => api,
            Err(resp) => return resp,
        };
        api.classes_delete(id)
    };
    match deleted {
        Ok(()) => {
            state.classes.remove(id);
            ok(&req.id, json!({ "deleted": id }))
        }
        Err(e) => api_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.open" | "classes.refresh" => Some(handle_open(state, req)),
        "classes.filter" => Some(handle_filter(state, req)),
        "classes.editorOpen" => Some(handle_editor_open(state, req)),
        "classes.editorCancel" => Some(handle_editor_cancel(state, req)),
        "classes.editorSubmit" => Some(handle_editor_submit(state, req)),
        "classes.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
