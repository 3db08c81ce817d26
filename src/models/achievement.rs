use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// An unlocked achievement row. The catalog of unlockable achievements lives
/// in [`crate::achievements`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub achievement_type: String,
    pub achieved_at: DateTime<Utc>,
}

impl FromSqliteRow for Achievement {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            achievement_type: row.get("achievement_type")?,
            achieved_at: row.get("achieved_at")?,
        })
    }
}
