use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::FromSqliteRow;

/// Closed enumeration of the seven routine days. Wire names are lowercase
/// English; display labels follow the product's pt-BR UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monday" => Some(Weekday::Monday),
            "tuesday" => Some(Weekday::Tuesday),
            "wednesday" => Some(Weekday::Wednesday),
            "thursday" => Some(Weekday::Thursday),
            "friday" => Some(Weekday::Friday),
            "saturday" => Some(Weekday::Saturday),
            "sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }

    pub fn from_date(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Segunda",
            Weekday::Tuesday => "Terça",
            Weekday::Wednesday => "Quarta",
            Weekday::Thursday => "Quinta",
            Weekday::Friday => "Sexta",
            Weekday::Saturday => "Sábado",
            Weekday::Sunday => "Domingo",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub category: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub day: Weekday,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let day_str: String = row.get("day")?;
        let day = Weekday::parse(&day_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("invalid weekday: {day_str}").into(),
            )
        })?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            category: row.get("category")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
            day,
            created_at: row.get("created_at")?,
        })
    }
}

/// Payload for creating an exercise. The gateway assigns id, owner, and
/// creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: f64,
    pub day: Weekday,
}

impl NewExercise {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("exercise name is required".to_string()));
        }
        if self.sets < 1 {
            return Err(Error::Validation("sets must be at least 1".to_string()));
        }
        if self.reps < 1 {
            return Err(Error::Validation("reps must be at least 1".to_string()));
        }
        if self.weight < 0.0 {
            return Err(Error::Validation("weight cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// Partial update for an exercise. The weekday is fixed at creation; moving
/// an exercise to another day means delete and re-create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExercisePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ExercisePatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("exercise name is required".to_string()));
            }
        }
        if matches!(self.sets, Some(s) if s < 1) {
            return Err(Error::Validation("sets must be at least 1".to_string()));
        }
        if matches!(self.reps, Some(r) if r < 1) {
            return Err(Error::Validation("reps must be at least 1".to_string()));
        }
        if matches!(self.weight, Some(w) if w < 0.0) {
            return Err(Error::Validation("weight cannot be negative".to_string()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.sets.is_none()
            && self.reps.is_none()
            && self.weight.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseCategory {
    pub name: &'static str,
    pub display_name: &'static str,
    pub suggestions: &'static [&'static str],
}

pub const CATEGORIES: &[ExerciseCategory] = &[
    ExerciseCategory {
        name: "chest",
        display_name: "Peito",
        suggestions: &["Supino Reto", "Supino Inclinado", "Crucifixo", "Flexão"],
    },
    ExerciseCategory {
        name: "back",
        display_name: "Costas",
        suggestions: &["Puxada na Frente", "Remada Baixa", "Pulldown", "Barra Fixa"],
    },
    ExerciseCategory {
        name: "legs",
        display_name: "Pernas",
        suggestions: &["Agachamento", "Leg Press", "Extensora", "Flexora"],
    },
    ExerciseCategory {
        name: "shoulders",
        display_name: "Ombros",
        suggestions: &["Desenvolvimento", "Elevação Lateral", "Elevação Frontal"],
    },
    ExerciseCategory {
        name: "biceps",
        display_name: "Bíceps",
        suggestions: &["Rosca Direta", "Rosca Alternada", "Rosca Martelo"],
    },
    ExerciseCategory {
        name: "triceps",
        display_name: "Tríceps",
        suggestions: &["Extensão na Polia", "Extensão Testa", "Supino Fechado"],
    },
    ExerciseCategory {
        name: "core",
        display_name: "Abdômen",
        suggestions: &["Prancha", "Crunch", "Elevação de Pernas"],
    },
    ExerciseCategory {
        name: "cardio",
        display_name: "Cardio",
        suggestions: &["Esteira", "Bicicleta", "Elíptico", "Corda"],
    },
];
