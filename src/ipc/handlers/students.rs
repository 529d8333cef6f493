use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_confirmed, param_student_id, student_rows};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;

const DELETE_PROMPT: &str = "Are you sure you want to delete this student?";

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return ok(
            &req.id,
            json!({ "students": [], "showEmptyWarning": true }),
        );
    };

    let rows = student_rows(
        session.roster.iter().map(|(id, rec)| (*id, rec)),
        session.editing,
    );
    ok(
        &req.id,
        json!({
            "students": rows,
            "showEmptyWarning": session.roster.is_empty(),
        }),
    )
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = param_student_id(req) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    if !session.roster.contains_key(&student_id) {
        return err(&req.id, "not_found", "student not found", None);
    }

    // The one mid-edit row keeps its delete control locked; every other row
    // stays deletable during an edit.
    if session.editing == Some(student_id) {
        return err(
            &req.id,
            "edit_in_progress",
            "finish or undo the edit on this student first",
            None,
        );
    }

    // Deletion is destructive: without the user's confirmation nothing moves.
    if !param_confirmed(req) {
        return ok(
            &req.id,
            json!({ "deleted": false, "confirm": DELETE_PROMPT }),
        );
    }

    session.remove(student_id);
    if let Some(conn) = state.db.as_ref() {
        store::persist_best_effort(conn, session);
    }

    ok(
        &req.id,
        json!({
            "deleted": true,
            "studentId": student_id,
            "showEmptyWarning": session.roster.is_empty(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
