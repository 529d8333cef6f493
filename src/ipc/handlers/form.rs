use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_confirmed, param_student_id, student_row, EDIT_HIGHLIGHT_MS};
use crate::ipc::types::{AppState, Request};
use crate::store;
use crate::validate;
use serde_json::json;

const EDIT_PROMPT: &str = "Are you sure you want to edit this student?";

fn field_error_json(e: validate::FieldError) -> serde_json::Value {
    json!({ "code": e.code(), "message": e.message() })
}

/// Blur-time validation of a single field. Pure: no session required.
fn handle_validate_field(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(field) = req.params.get("field").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing field", None);
    };
    let value = req
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match validate::validate_field(field, value) {
        Some(Ok(())) => ok(&req.id, json!({ "field": field, "valid": true })),
        Some(Err(e)) => ok(
            &req.id,
            json!({ "field": field, "valid": false, "error": field_error_json(e) }),
        ),
        None => err(
            &req.id,
            "bad_params",
            format!("unknown field: {field}"),
            None,
        ),
    }
}

/// Edit click: load the record into the form and mark its row. If another
/// row was mid-edit, the response names it so the renderer reverts its
/// controls first; only one row carries the undo affordance.
fn handle_begin_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = param_student_id(req) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    let Some(record) = session.roster.get(&student_id) else {
        return err(&req.id, "not_found", "student not found", None);
    };

    let previous = session.editing.filter(|prev| *prev != student_id);
    session.editing = Some(student_id);

    ok(
        &req.id,
        json!({
            "mode": "edit",
            "submitLabel": "Edit",
            "studentId": student_id,
            "fields": {
                "firstName": record.first_name,
                "lastName": record.last_name,
                "age": record.age,
                "email": record.email,
                "phone": record.phone,
            },
            "previousEditingId": previous,
        }),
    )
}

/// Undo (and the reset button, which only shows during an edit): back to Add
/// with no roster mutation. Idempotent when nothing was being edited.
fn handle_undo(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let previous = session.editing.take();
    ok(
        &req.id,
        json!({
            "mode": "add",
            "submitLabel": "Add",
            "previousEditingId": previous,
        }),
    )
}

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(values) = req.params.get("values").filter(|v| v.is_object()) else {
        return err(&req.id, "bad_params", "missing values object", None);
    };

    // Validation failure is user feedback, not a protocol error: report
    // every failing field and leave both state and mode untouched.
    let record = match validate::validate_record(values) {
        Ok(record) => record,
        Err(errors) => {
            let mut field_errors = serde_json::Map::new();
            for (field, e) in errors {
                field_errors.insert(field.to_string(), field_error_json(e));
            }
            return ok(
                &req.id,
                json!({
                    "submitted": false,
                    "mode": if session.editing.is_some() { "edit" } else { "add" },
                    "fieldErrors": field_errors,
                }),
            );
        }
    };

    match session.editing {
        None => {
            let inserted = record.clone();
            let student_id = session.insert(record);
            if let Some(conn) = state.db.as_ref() {
                store::persist_best_effort(conn, session);
            }
            let row = student_row(student_id, &inserted, None);
            ok(
                &req.id,
                json!({
                    "submitted": true,
                    "mode": "add",
                    "submitLabel": "Add",
                    "student": row,
                    "nextId": session.next_id,
                    "highlight": false,
                    "showEmptyWarning": false,
                }),
            )
        }
        Some(student_id) => {
            // Overwriting an existing record is destructive; declining the
            // confirmation leaves the form in Edit mode with nothing changed.
            if !param_confirmed(req) {
                return ok(
                    &req.id,
                    json!({
                        "submitted": false,
                        "mode": "edit",
                        "confirm": EDIT_PROMPT,
                    }),
                );
            }

            let replaced = record.clone();
            if !session.replace(student_id, record) {
                session.editing = None;
                return err(&req.id, "not_found", "student not found", None);
            }
            session.editing = None;
            if let Some(conn) = state.db.as_ref() {
                store::persist_best_effort(conn, session);
            }

            let row = student_row(student_id, &replaced, None);
            ok(
                &req.id,
                json!({
                    "submitted": true,
                    "mode": "add",
                    "submitLabel": "Add",
                    "student": row,
                    "highlight": true,
                    "highlightDurationMs": EDIT_HIGHLIGHT_MS,
                    "showEmptyWarning": false,
                }),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "form.validateField" => Some(handle_validate_field(state, req)),
        "form.beginEdit" => Some(handle_begin_edit(state, req)),
        "form.undo" | "form.reset" => Some(handle_undo(state, req)),
        "form.submit" => Some(handle_submit(state, req)),
        _ => None,
    }
}
