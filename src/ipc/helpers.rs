use serde_json::json;

use crate::ipc::types::Request;
use crate::roster::StudentRecord;

/// How long the renderer keeps the replaced-row highlight before clearing it.
pub const EDIT_HIGHLIGHT_MS: u64 = 3000;

/// Row view model. `editing` drives the undo affordance and the locked
/// delete button on the one mid-edit row.
pub fn student_row(id: u64, record: &StudentRecord, editing: Option<u64>) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": record.first_name,
        "lastName": record.last_name,
        "age": record.age,
        "email": record.email,
        "phone": record.phone,
        "editing": editing == Some(id),
    })
}

pub fn student_rows<'a>(
    entries: impl IntoIterator<Item = (u64, &'a StudentRecord)>,
    editing: Option<u64>,
) -> Vec<serde_json::Value> {
    entries
        .into_iter()
        .map(|(id, record)| student_row(id, record, editing))
        .collect()
}

/// Row ids arrive as the row's dataset value, so accept both a JSON number
/// and a decimal string.
pub fn param_student_id(req: &Request) -> Option<u64> {
    let v = req.params.get("studentId")?;
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<u64>().ok()
}

pub fn param_confirmed(req: &Request) -> bool {
    req.params
        .get("confirmed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
