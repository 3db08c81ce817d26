use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub avatar_url: Option<String>,
    pub goal: String,
    pub level: i32,
    pub xp: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromSqliteRow for Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            birth_date: row.get("birth_date")?,
            gender: row.get("gender")?,
            avatar_url: row.get("avatar_url")?,
            goal: row.get("goal")?,
            level: row.get("level")?,
            xp: row.get("xp")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Gateway-level partial update of the profile row. Unset fields keep their
/// stored values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// User-facing profile edit: the personal-information form plus the optional
/// current weight/height, which append a new body-stat entry instead of
/// mutating history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub goal: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

/// One body-stat measurement (the original `user_stats` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyStat {
    pub id: String,
    pub user_id: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for BodyStat {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: String,
    pub user_id: String,
    pub exercise_name: String,
    pub weight_kg: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for PersonalRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            exercise_name: row.get("exercise_name")?,
            weight_kg: row.get("weight_kg")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }
}
