use serde::de::DeserializeOwned;

use crate::api::ApiClient;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn flag(req: &Request, key: &str) -> bool {
    req.params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Deserializes the whole params object into an editor payload.
pub fn payload<T: DeserializeOwned>(req: &Request) -> Result<T, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

/// Every entity handler needs a selected backend; mirrors the way nothing
/// works before a workspace is chosen.
pub fn api<'a>(state: &'a AppState, req: &Request) -> Result<&'a ApiClient, serde_json::Value> {
    state
        .api
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_backend", "select a backend first", None))
}

pub fn api_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut ApiClient, serde_json::Value> {
    state
        .api
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_backend", "select a backend first", None))
}
