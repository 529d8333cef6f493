use crate::ipc::error::ok;
use crate::ipc::helpers::student_rows;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Live filter: recomputed on every keystroke, so this stays a pure read of
/// the roster. The empty-state warning tracks the filtered view, not the
/// underlying roster.
fn handle_students_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let query = req
        .params
        .get("query")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let Some(session) = state.session.as_ref() else {
        return ok(
            &req.id,
            json!({ "students": [], "showEmptyWarning": true, "query": query }),
        );
    };

    let hits = session.search(query);
    let show_empty = hits.is_empty();
    let rows = student_rows(hits, session.editing);

    ok(
        &req.id,
        json!({
            "students": rows,
            "showEmptyWarning": show_empty,
            "query": query,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.search" => Some(handle_students_search(state, req)),
        _ => None,
    }
}
