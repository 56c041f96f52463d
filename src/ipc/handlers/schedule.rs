use serde_json::json;

use crate::ipc::error::{api_err, err, ok};
use crate::ipc::helpers;
use crate::ipc::types::{AppState, Request};

const WEEK_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fetched = match helpers::api(state, req) {
        Ok(api) => api.schedule_list(),
        Err(resp) => return resp,
    };
    match fetched {
        Ok(items) => {
            state.schedule = items;
            ok(
                &req.id,
                json!({ "schedule": state.schedule, "days": WEEK_DAYS }),
            )
        }
        Err(e) => {
            state.schedule.clear();
            api_err(&req.id, e)
        }
    }
}

/// Per-day subset, filtered client-side from the already-fetched timetable.
fn handle_for_day(state: &mut AppState, req: &Request) -> serde_json::Value {
    let day = match helpers::required_str(req, "day") {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    if !WEEK_DAYS.contains(&day.as_str()) {
        return err(
            &req.id,
            "bad_params",
            "day must be Monday through Friday",
            None,
        );
    }
    let items: Vec<_> = state.schedule.iter().filter(|i| i.day == day).collect();
    ok(&req.id, json!({ "day": day, "schedule": items }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.open" | "schedule.refresh" => Some(handle_open(state, req)),
        "schedule.forDay" => Some(handle_for_day(state, req)),
        _ => None,
    }
}
