use serde::{Deserialize, Serialize};

/// Outcome of a data-modification statement
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryResult {
    pub changes: usize,
    pub last_insert_rowid: i64,
}
