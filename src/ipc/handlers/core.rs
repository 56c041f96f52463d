use serde_json::json;
use tracing::info;

use crate::api::ApiClient;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "backend": state.api.as_ref().map(|a| a.mode()),
        }),
    )
}

/// Points the sidecar at a backend: `{ "mode": "mock" }` for the bundled
/// fixtures, or `{ "baseUrl": "http://..." }` for a live REST deployment.
/// Every entity handler refuses to run until one is selected.
fn handle_backend_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mode = req.params.get("mode").and_then(|v| v.as_str());
    let base_url = req.params.get("baseUrl").and_then(|v| v.as_str());

    let built = match (mode, base_url) {
        (Some("mock"), _) => ApiClient::mock(),
        (_, Some(url)) if !url.trim().is_empty() => ApiClient::http(url),
        _ => {
            return err(
                &req.id,
                "bad_params",
                "pass mode \"mock\" or a baseUrl",
                None,
            )
        }
    };

    match built {
        Ok(client) => {
            info!(backend = client.mode(), "backend selected");
            let mode = client.mode();
            state.api = Some(client);
            ok(&req.id, json!({ "backend": mode }))
        }
        Err(e) => err(&req.id, "backend_select_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "backend.select" => Some(handle_backend_select(state, req)),
        _ => None,
    }
}
