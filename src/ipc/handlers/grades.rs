use serde_json::json;

use crate::ipc::error::{api_err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use crate::stats;

fn rows(state: &AppState) -> serde_json::Value {
    let filtered: Vec<&Grade> = state.grades.filtered();
    json!({
        "grades": filtered,
        "total": state.grades.len(),
        "query": state.grades.query(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.grades_list(),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(grades) => {
            state.grades.set_items(grades);
            ok(&req.id, rows(state))
        }
        Err(e) => {
            state.grades.set_items(Vec::new());
            api_err(&req.id, e)
        }
    }
}

fn handle_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = match helpers::required_str(req, "query") {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    state.grades.set_query(&query);
    ok(&req.id, rows(state))
}

/// One student's grades, a full fetch filtered client-side.
fn handle_for_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match helpers::required_i64(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.grades_for_student(student_id),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(grades) => {
            let overall = stats::overall_average(&grades);
            let per_subject = stats::subject_averages(&grades);
            ok(
                &req.id,
                json!({
                    "studentId": student_id,
                    "grades": grades,
                    "overallAverage": overall,
                    "subjectAverages": per_subject,
                }),
            )
        }
        Err(e) => api_err(&req.id, e),
    }
}

/// At-a-glance aggregation over the screen's current collection.
fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let grades = state.grades.items();
    let bands: serde_json::Map<String, serde_json::Value> = stats::band_counts(grades)
        .into_iter()
        .map(|(band, n)| (band.to_string(), json!(n)))
        .collect();
    ok(
        &req.id,
        json!({
            "count": grades.len(),
            "overallAverage": stats::overall_average(grades),
            "subjectAverages": stats::subject_averages(grades),
            "bands": bands,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.open" | "grades.refresh" => Some(handle_open(state, req)),
        "grades.filter" => Some(handle_filter(state, req)),
        "grades.forStudent" => Some(handle_for_student(state, req)),
        "grades.summary" => Some(handle_summary(state, req)),
        _ => None,
    }
}
