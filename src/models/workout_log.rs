use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// One exercise performed within a logged workout. Stored as a JSON column
/// on the log row, matching the hosted schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedExercise {
    pub name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    pub user_id: String,
    pub workout_date: NaiveDate,
    pub completed_exercises: Vec<CompletedExercise>,
    pub notes: Option<String>,
    pub energy_level: Option<i32>,
    pub pain_level: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for WorkoutLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let completed_json: String = row.get("completed_exercises")?;
        let completed_exercises = serde_json::from_str(&completed_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            workout_date: row.get("workout_date")?,
            completed_exercises,
            notes: row.get("notes")?,
            energy_level: row.get("energy_level")?,
            pain_level: row.get("pain_level")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutLog {
    pub workout_date: NaiveDate,
    pub completed_exercises: Vec<CompletedExercise>,
    pub notes: Option<String>,
    pub energy_level: Option<i32>,
    pub pain_level: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutNote {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for WorkoutNote {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            content: row.get("content")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_exercises_json_round_trip() {
        let completed = vec![CompletedExercise {
            name: "Agachamento".to_string(),
            sets: 4,
            reps: 10,
            weight_kg: 80.0,
        }];
        let json = serde_json::to_string(&completed).unwrap();
        let back: Vec<CompletedExercise> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, completed);
    }
}
