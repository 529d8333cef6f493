use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_daemon() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
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

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn student(first: &str, phone: &str) -> serde_json::Value {
    json!({
        "firstName": first,
        "lastName": "Lee",
        "age": "20",
        "email": "a@gmail.com",
        "phone": phone,
    })
}

fn setup_two_students(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &PathBuf,
) {
    let _ = request_ok(
        stdin,
        reader,
        "setup-ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "setup-a",
        "form.submit",
        json!({ "values": student("Ann", "01012345678") }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "setup-b",
        "form.submit",
        json!({ "values": student("Bob", "01112345678") }),
    );
}

#[test]
fn begin_edit_populates_fields_and_relabels_submit() {
    let workspace = temp_dir("rosterd-edit-begin");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let begun = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    assert_eq!(begun["mode"], json!("edit"));
    assert_eq!(begun["submitLabel"], json!("Edit"));
    assert_eq!(begun["fields"]["firstName"], json!("Ann"));
    assert_eq!(begun["fields"]["phone"], json!("01012345678"));
    assert!(begun["previousEditingId"].is_null());

    // The mid-edit row is flagged so the renderer shows Undo and locks Delete.
    let listed = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    let students = listed["students"].as_array().expect("students");
    assert_eq!(students[0]["editing"], json!(true));
    assert_eq!(students[1]["editing"], json!(false));
}

#[test]
fn switching_rows_reverts_the_previous_edit_affordance() {
    let workspace = temp_dir("rosterd-edit-switch");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "form.beginEdit",
        json!({ "studentId": 2 }),
    );
    assert_eq!(second["previousEditingId"], json!(1));

    // Only one row may carry the undo affordance.
    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let editing: Vec<bool> = listed["students"]
        .as_array()
        .expect("students")
        .iter()
        .map(|row| row["editing"].as_bool().unwrap_or(false))
        .collect();
    assert_eq!(editing, vec![false, true]);
}

#[test]
fn unconfirmed_edit_submit_changes_nothing() {
    let workspace = temp_dir("rosterd-edit-unconfirmed");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    let declined = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "form.submit",
        json!({ "values": student("Anna", "01012345678") }),
    );
    assert_eq!(declined["submitted"], json!(false));
    assert_eq!(declined["mode"], json!("edit"));
    assert!(declined["confirm"].as_str().expect("prompt").contains("edit"));

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed["students"].as_array().expect("students");
    assert_eq!(students[0]["firstName"], json!("Ann"));
    assert_eq!(students[0]["editing"], json!(true));
}

#[test]
fn confirmed_edit_replaces_in_place_and_highlights() {
    let workspace = temp_dir("rosterd-edit-confirmed");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    let submitted = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "form.submit",
        json!({ "values": student("Anna", "01012345678"), "confirmed": true }),
    );
    assert_eq!(submitted["submitted"], json!(true));
    assert_eq!(submitted["mode"], json!("add"));
    assert_eq!(submitted["student"]["id"], json!(1));
    assert_eq!(submitted["student"]["firstName"], json!("Anna"));
    assert_eq!(submitted["highlight"], json!(true));
    assert_eq!(submitted["highlightDurationMs"], json!(3000));

    // Same size, same key, new value; no row is mid-edit anymore.
    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed["students"].as_array().expect("students");
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["id"], json!(1));
    assert_eq!(students[0]["firstName"], json!("Anna"));
    assert_eq!(students[0]["editing"], json!(false));
}

#[test]
fn undo_returns_to_add_without_mutating() {
    let workspace = temp_dir("rosterd-edit-undo");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 2 }),
    );
    let undone = request_ok(&mut stdin, &mut reader, "2", "form.undo", json!({}));
    assert_eq!(undone["mode"], json!("add"));
    assert_eq!(undone["submitLabel"], json!("Add"));
    assert_eq!(undone["previousEditingId"], json!(2));

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed["students"].as_array().expect("students");
    assert_eq!(students[1]["firstName"], json!("Bob"));
    assert_eq!(students[1]["editing"], json!(false));

    // A second undo (or the reset button) is a no-op in Add mode.
    let reset = request_ok(&mut stdin, &mut reader, "4", "form.reset", json!({}));
    assert_eq!(reset["mode"], json!("add"));
    assert!(reset["previousEditingId"].is_null());
}

#[test]
fn deleting_the_mid_edit_row_is_refused() {
    let workspace = temp_dir("rosterd-edit-lock");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    let refused = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.delete",
        json!({ "studentId": 1, "confirmed": true }),
    );
    assert_eq!(refused.get("ok"), Some(&json!(false)));
    assert_eq!(
        refused["error"]["code"],
        json!("edit_in_progress")
    );

    // Other rows stay deletable during the edit.
    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.delete",
        json!({ "studentId": 2, "confirmed": true }),
    );
    assert_eq!(deleted["deleted"], json!(true));
}

#[test]
fn invalid_edit_submission_keeps_edit_mode() {
    let workspace = temp_dir("rosterd-edit-invalid");
    let (_child, mut stdin, mut reader) = spawn_daemon();
    setup_two_students(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "form.beginEdit",
        json!({ "studentId": 1 }),
    );
    let submitted = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "form.submit",
        json!({ "values": student("", "01012345678"), "confirmed": true }),
    );
    assert_eq!(submitted["submitted"], json!(false));
    assert_eq!(submitted["mode"], json!("edit"));
    assert_eq!(
        submitted["fieldErrors"]["firstName"]["code"],
        json!("required")
    );
}
