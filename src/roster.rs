use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One student's field set, stored trimmed. Age stays a string: the wire and
/// the persisted form both carry it verbatim, and validation already pins it
/// to 1-3 digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub email: String,
    pub phone: String,
}

impl StudentRecord {
    /// Field values in form order, for searching and row rendering.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("age", self.age.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
        ]
    }
}

/// Ordered map so renders always iterate ascending by id.
pub type Roster = BTreeMap<u64, StudentRecord>;

/// In-memory state for one selected workspace. `editing == None` means the
/// form is in Add mode.
pub struct Session {
    pub roster: Roster,
    pub next_id: u64,
    pub editing: Option<u64>,
}

impl Session {
    pub fn new(roster: Roster, stored_next_id: u64) -> Self {
        // Ids are never reused: keep the counter above every surviving key
        // even if the stored counter was lost or corrupted.
        let floor = roster
            .keys()
            .next_back()
            .map(|max| max + 1)
            .unwrap_or(1);
        Session {
            roster,
            next_id: stored_next_id.max(floor).max(1),
            editing: None,
        }
    }

    /// Appends under a freshly allocated id and advances the counter.
    pub fn insert(&mut self, record: StudentRecord) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.roster.insert(id, record);
        id
    }

    /// Replaces the record at `id` in place. False if the id is unknown.
    pub fn replace(&mut self, id: u64, record: StudentRecord) -> bool {
        match self.roster.get_mut(&id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.roster.remove(&id).is_some()
    }

    /// Case-insensitive substring filter over the id and every field value.
    /// A blank query returns the whole roster. Pure view: the roster is not
    /// touched.
    pub fn search(&self, query: &str) -> Vec<(u64, &StudentRecord)> {
        let q = query.trim().to_lowercase();
        self.roster
            .iter()
            .filter(|(id, record)| {
                if q.is_empty() {
                    return true;
                }
                if id.to_string().contains(&q) {
                    return true;
                }
                record
                    .fields()
                    .iter()
                    .any(|(_, value)| value.to_lowercase().contains(&q))
            })
            .map(|(id, record)| (*id, record))
            .collect()
    }
}
