use serde_json::json;

use crate::api::ApiError;

/// Success envelope: `{ id, ok: true, result }`.
pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

/// Failure envelope: `{ id, ok: false, error: { code, message, details? } }`.
/// Codes are stable strings the shell can branch on; messages are for the
/// notification channel.
pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Maps a resource-client failure onto the protocol error taxonomy. The
/// triggering local state change is the caller's to withhold; nothing here
/// is fatal and every one of these is user-retryable.
pub fn api_err(id: &str, e: ApiError) -> serde_json::Value {
    match e {
        ApiError::Transport(inner) => err(id, "network_failed", inner.to_string(), None),
        ApiError::Rejected { status, message } => err(
            id,
            "backend_rejected",
            message,
            Some(json!({ "status": status })),
        ),
        ApiError::BadResponse(msg) => err(id, "bad_response", msg, None),
        ApiError::NotFound(what) => err(id, "not_found", format!("{} not found", what), None),
    }
}
