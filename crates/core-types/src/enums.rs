use serde::{Deserialize, Serialize};

/// What a conflict-aware insert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same id already existed; nothing changed.
    Unchanged,
}

impl UpsertOutcome {
    /// Maps the affected-row count of an `ON CONFLICT DO NOTHING` insert.
    pub fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            UpsertOutcome::Unchanged
        } else {
            UpsertOutcome::Inserted
        }
    }
}
