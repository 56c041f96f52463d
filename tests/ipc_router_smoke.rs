use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .env_remove("SCHOOLDESK_BACKEND_URL")
        .env_remove("SCHOOLDESK_MOCK")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn error_code(resp: &serde_json::Value) -> &str {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], true);
    assert!(health["result"]["backend"].is_null());

    // Every entity handler is gated on a selected backend.
    let gated = request(&mut stdin, &mut reader, "2", "teachers.open", json!({}));
    assert_eq!(gated["ok"], false);
    assert_eq!(error_code(&gated), "no_backend");

    let selected = request(
        &mut stdin,
        &mut reader,
        "3",
        "backend.select",
        json!({ "mode": "mock" }),
    );
    assert_eq!(selected["ok"], true);
    assert_eq!(selected["result"]["backend"], "mock");

    let teachers = request(&mut stdin, &mut reader, "4", "teachers.open", json!({}));
    assert_eq!(teachers["ok"], true);
    assert!(teachers["result"]["teachers"].as_array().expect("rows").len() >= 3);
    assert!(!teachers["result"]["roles"].as_array().expect("roles").is_empty());

    let students = request(&mut stdin, &mut reader, "5", "students.open", json!({}));
    assert_eq!(students["ok"], true);

    let classes = request(&mut stdin, &mut reader, "6", "classes.open", json!({}));
    assert_eq!(classes["ok"], true);
    assert!(classes["result"]["classes"].as_array().expect("rows").len() >= 2);

    let schedule = request(&mut stdin, &mut reader, "7", "schedule.open", json!({}));
    assert_eq!(schedule["ok"], true);
    let monday = request(
        &mut stdin,
        &mut reader,
        "8",
        "schedule.forDay",
        json!({ "day": "Monday" }),
    );
    assert_eq!(monday["ok"], true);
    for item in monday["result"]["schedule"].as_array().expect("items") {
        assert_eq!(item["day"], "Monday");
    }

    let grades = request(&mut stdin, &mut reader, "9", "grades.open", json!({}));
    assert_eq!(grades["ok"], true);
    let summary = request(&mut stdin, &mut reader, "10", "grades.summary", json!({}));
    assert_eq!(summary["ok"], true);
    assert!(summary["result"]["overallAverage"].is_number());

    let attendance = request(&mut stdin, &mut reader, "11", "attendance.open", json!({}));
    assert_eq!(attendance["ok"], true);
    assert!(attendance["result"]["selectedClass"].is_null());

    let wizard = request(&mut stdin, &mut reader, "12", "reports.open", json!({}));
    assert_eq!(wizard["ok"], true);
    assert_eq!(wizard["result"]["stepIndex"], 0);

    let unknown = request(&mut stdin, &mut reader, "13", "nope.nothing", json!({}));
    assert_eq!(unknown["ok"], false);
    assert_eq!(error_code(&unknown), "not_implemented");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn backend_select_rejects_empty_params() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let resp = request(&mut stdin, &mut reader, "1", "backend.select", json!({}));
    assert_eq!(resp["ok"], false);
    assert_eq!(error_code(&resp), "bad_params");
    drop(stdin);
    let _ = child.wait();
}

#[test]
fn unparseable_line_gets_bad_json_and_the_loop_keeps_serving() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    writeln!(stdin, "this is not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let resp: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(resp["ok"], false);
    assert_eq!(error_code(&resp), "bad_json");
    assert!(resp.get("id").is_none());

    // The next well-formed request is served normally.
    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], true);

    drop(stdin);
    let _ = child.wait();
}

/// Aggregation over the mock grade fixtures: six rows with percentages
/// 92, 86, 90, 78, 70 and 93.3, so the overall mean is 84.9 to one decimal
/// and the letter bands split A:3 / B:1 / C:2.
#[test]
fn grades_aggregation_matches_fixture_data() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request(
        &mut stdin,
        &mut reader,
        "1",
        "backend.select",
        json!({ "mode": "mock" }),
    );
    let opened = request(&mut stdin, &mut reader, "2", "grades.open", json!({}));
    assert_eq!(opened["ok"], true);
    assert_eq!(opened["result"]["total"], 6);

    let summary = request(&mut stdin, &mut reader, "3", "grades.summary", json!({}));
    assert_eq!(summary["ok"], true);
    assert_eq!(summary["result"]["count"], 6);
    assert_eq!(summary["result"]["overallAverage"], 84.9);
    assert_eq!(summary["result"]["bands"]["A"], 3);
    assert_eq!(summary["result"]["bands"]["B"], 1);
    assert_eq!(summary["result"]["bands"]["C"], 2);
    assert!(summary["result"]["bands"].get("F").is_none());

    // One student's slice: rows 92%, 86%, 90% -> 89.3 overall, with
    // per-subject means of 91.0 (Mathematics) and 86.0 (Physics).
    let student = request(
        &mut stdin,
        &mut reader,
        "4",
        "grades.forStudent",
        json!({ "studentId": 1 }),
    );
    assert_eq!(student["ok"], true);
    assert_eq!(student["result"]["grades"].as_array().expect("rows").len(), 3);
    assert_eq!(student["result"]["overallAverage"], 89.3);
    let per_subject = student["result"]["subjectAverages"]
        .as_array()
        .expect("subject averages");
    assert_eq!(per_subject.len(), 2);
    assert_eq!(per_subject[0]["subject"], "Mathematics");
    assert_eq!(per_subject[0]["average"], 91.0);
    assert_eq!(per_subject[1]["subject"], "Physics");
    assert_eq!(per_subject[1]["average"], 86.0);

    drop(stdin);
    let _ = child.wait();
}
