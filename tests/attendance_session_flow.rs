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
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn error_code(resp: &serde_json::Value) -> &str {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

/// The end-to-end session from the mock fixtures: class 1 has exactly three
/// students; mark the second Absent, save, and check the bulk payload and
/// the tally.
#[test]
fn mark_one_absent_and_save_session() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let sel = request(
        &mut stdin,
        &mut reader,
        "1",
        "backend.select",
        json!({ "mode": "mock" }),
    );
    assert_eq!(sel["ok"], true);

    // Save before selecting anything is a local validation error.
    let early = request(&mut stdin, &mut reader, "2", "attendance.save", json!({}));
    assert_eq!(early["ok"], false);
    assert_eq!(error_code(&early), "validation_failed");

    let opened = request(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.selectClass",
        json!({ "classId": 1 }),
    );
    assert_eq!(opened["ok"], true);
    let rows = opened["result"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row["record"]["status"], "Present");
        assert_eq!(row["record"]["signIn"], "08:00");
        assert_eq!(row["record"]["signOut"], "15:30");
        assert_eq!(row["timesEditable"], true);
    }
    assert_eq!(opened["result"]["summary"]["present"], 3);

    let dated = request(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.setDate",
        json!({ "date": "2025-03-14" }),
    );
    assert_eq!(dated["ok"], true);

    let second_student = rows[1]["student"]["id"].as_i64().expect("student id");
    let marked = request(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.setField",
        json!({ "studentId": second_student, "field": "status", "value": "Absent" }),
    );
    assert_eq!(marked["ok"], true);
    // Absence locks the time fields but keeps their stored values.
    assert_eq!(marked["result"]["timesEditable"], false);
    assert_eq!(marked["result"]["record"]["signIn"], "08:00");
    assert_eq!(marked["result"]["record"]["signOut"], "15:30");

    let summary = request(&mut stdin, &mut reader, "6", "attendance.summary", json!({}));
    assert_eq!(summary["result"]["summary"]["present"], 2);
    assert_eq!(summary["result"]["summary"]["absent"], 1);
    assert_eq!(summary["result"]["summary"]["late"], 0);
    assert_eq!(summary["result"]["rosterSize"], 3);

    let saved = request(&mut stdin, &mut reader, "7", "attendance.save", json!({}));
    assert_eq!(saved["ok"], true);
    assert_eq!(saved["result"]["saved"], 3);

    let after = request(&mut stdin, &mut reader, "8", "attendance.open", json!({}));
    assert_eq!(after["result"]["dirty"], false);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn class_switch_over_unsaved_edits_needs_explicit_discard() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request(
        &mut stdin,
        &mut reader,
        "1",
        "backend.select",
        json!({ "mode": "mock" }),
    );
    let first = request(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.selectClass",
        json!({ "classId": 1 }),
    );
    assert_eq!(first["ok"], true);
    let student = first["result"]["rows"][0]["student"]["id"]
        .as_i64()
        .expect("student id");
    request(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.setField",
        json!({ "studentId": student, "field": "notes", "value": "late bus" }),
    );

    // Dirty draft blocks the destructive replace.
    let blocked = request(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.selectClass",
        json!({ "classId": 2 }),
    );
    assert_eq!(blocked["ok"], false);
    assert_eq!(error_code(&blocked), "unsaved_draft");

    // The blocked switch left the old roster intact.
    let still = request(&mut stdin, &mut reader, "5", "attendance.open", json!({}));
    assert_eq!(still["result"]["selectedClass"], 1);
    assert_eq!(still["result"]["dirty"], true);

    let switched = request(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.selectClass",
        json!({ "classId": 2, "discardEdits": true }),
    );
    assert_eq!(switched["ok"], true);
    assert_eq!(switched["result"]["selectedClass"], 2);
    assert_eq!(switched["result"]["dirty"], false);
    let rows = switched["result"]["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["record"]["status"], "Present");
        assert_eq!(row["record"]["notes"], "");
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_field_and_unknown_class_are_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request(
        &mut stdin,
        &mut reader,
        "1",
        "backend.select",
        json!({ "mode": "mock" }),
    );
    let missing = request(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.selectClass",
        json!({ "classId": 999 }),
    );
    assert_eq!(missing["ok"], false);
    assert_eq!(error_code(&missing), "not_found");

    request(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.selectClass",
        json!({ "classId": 1 }),
    );
    let bad_field = request(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.setField",
        json!({ "studentId": 1, "field": "mood", "value": "ok" }),
    );
    assert_eq!(bad_field["ok"], false);
    assert_eq!(error_code(&bad_field), "bad_params");

    let bad_status = request(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.setField",
        json!({ "studentId": 1, "field": "status", "value": "Sick" }),
    );
    assert_eq!(bad_status["ok"], false);

    let bad_date = request(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.setDate",
        json!({ "date": "14/03/2025" }),
    );
    assert_eq!(bad_date["ok"], false);
    assert_eq!(error_code(&bad_date), "bad_params");

    drop(stdin);
    let _ = child.wait();
}
