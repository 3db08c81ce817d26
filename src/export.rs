//! CSV export and import of the user's data.
//!
//! The export produces four documents, one per table. Import accepts the
//! same documents back; the profile document is informational only and has
//! no import path.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::models::{CompletedExercise, NewWorkoutLog};
use crate::session::Identity;
use crate::AccountOverview;

pub const PROFILE_FILE: &str = "profile.csv";
pub const STATS_FILE: &str = "stats.csv";
pub const RECORDS_FILE: &str = "records.csv";
pub const WORKOUT_LOGS_FILE: &str = "workout_logs.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The four CSV documents of a full export.
#[derive(Debug, Clone, PartialEq)]
pub struct DataExport {
    pub profile: String,
    pub stats: String,
    pub records: String,
    pub workout_logs: String,
}

impl DataExport {
    /// (file name, contents) pairs, in download order.
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            (PROFILE_FILE, self.profile.as_str()),
            (STATS_FILE, self.stats.as_str()),
            (RECORDS_FILE, self.records.as_str()),
            (WORKOUT_LOGS_FILE, self.workout_logs.as_str()),
        ]
    }
}

pub fn export(overview: &AccountOverview) -> Result<DataExport> {
    let mut profile = csv::Writer::from_writer(vec![]);
    profile.write_record(["name", "birth_date", "gender", "goal", "level", "xp"])?;
    profile.write_record([
        overview.profile.name.clone(),
        overview
            .profile
            .birth_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        overview.profile.gender.clone(),
        overview.profile.goal.clone(),
        overview.profile.level.to_string(),
        overview.profile.xp.to_string(),
    ])?;

    let mut stats = csv::Writer::from_writer(vec![]);
    stats.write_record(["date", "weight_kg", "height_cm"])?;
    for stat in &overview.body_stats {
        stats.write_record([
            stat.date.format(DATE_FORMAT).to_string(),
            stat.weight_kg.to_string(),
            stat.height_cm.to_string(),
        ])?;
    }

    let mut records = csv::Writer::from_writer(vec![]);
    records.write_record(["exercise_name", "weight_kg", "date"])?;
    for record in &overview.personal_records {
        records.write_record([
            record.exercise_name.clone(),
            record.weight_kg.to_string(),
            record.date.format(DATE_FORMAT).to_string(),
        ])?;
    }

    let mut logs = csv::Writer::from_writer(vec![]);
    logs.write_record([
        "workout_date",
        "completed_exercises",
        "notes",
        "energy_level",
        "pain_level",
        "created_at",
    ])?;
    for log in &overview.workout_logs {
        logs.write_record([
            log.workout_date.format(DATE_FORMAT).to_string(),
            serde_json::to_string(&log.completed_exercises)
                .map_err(|e| Error::Import(e.to_string()))?,
            log.notes.clone().unwrap_or_default(),
            log.energy_level.map(|v| v.to_string()).unwrap_or_default(),
            log.pain_level.map(|v| v.to_string()).unwrap_or_default(),
            log.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ])?;
    }

    Ok(DataExport {
        profile: finish(profile)?,
        stats: finish(stats)?,
        records: finish(records)?,
        workout_logs: finish(logs)?,
    })
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Import(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Import(e.to_string()))
}

/// Re-imports a `stats.csv` document. Returns the number of rows inserted.
pub async fn import_body_stats(
    gateway: &dyn Gateway,
    identity: &Identity,
    data: &str,
) -> Result<usize> {
    let owner = identity.require_auth()?;
    let mut count = 0;
    for row in parse(data, &["date", "weight_kg", "height_cm"])? {
        let weight_kg = parse_number(&row[1], "weight_kg")?;
        let height_cm = parse_number(&row[2], "height_cm")?;
        gateway.insert_body_stat(owner, weight_kg, height_cm).await?;
        count += 1;
    }
    tracing::info!("Imported {} body stats", count);
    Ok(count)
}

/// Re-imports a `records.csv` document. Returns the number of rows inserted.
pub async fn import_personal_records(
    gateway: &dyn Gateway,
    identity: &Identity,
    data: &str,
) -> Result<usize> {
    let owner = identity.require_auth()?;
    let mut count = 0;
    for row in parse(data, &["exercise_name", "weight_kg", "date"])? {
        let weight_kg = parse_number(&row[1], "weight_kg")?;
        let date = parse_date(&row[2])?;
        gateway
            .insert_personal_record(owner, &row[0], weight_kg, date)
            .await?;
        count += 1;
    }
    tracing::info!("Imported {} personal records", count);
    Ok(count)
}

/// Re-imports a `workout_logs.csv` document. Returns the number of rows
/// inserted.
pub async fn import_workout_logs(
    gateway: &dyn Gateway,
    identity: &Identity,
    data: &str,
) -> Result<usize> {
    let owner = identity.require_auth()?;
    let mut count = 0;
    let columns = [
        "workout_date",
        "completed_exercises",
        "notes",
        "energy_level",
        "pain_level",
        "created_at",
    ];
    for row in parse(data, &columns)? {
        let completed_exercises: Vec<CompletedExercise> = serde_json::from_str(&row[1])
            .map_err(|e| Error::Import(format!("bad completed_exercises: {e}")))?;
        let log = NewWorkoutLog {
            workout_date: parse_date(&row[0])?,
            completed_exercises,
            notes: non_empty(&row[2]),
            energy_level: parse_optional_int(&row[3], "energy_level")?,
            pain_level: parse_optional_int(&row[4], "pain_level")?,
        };
        gateway.insert_workout_log(owner, &log).await?;
        count += 1;
    }
    tracing::info!("Imported {} workout logs", count);
    Ok(count)
}

/// Parses a CSV document, checking the header and the width of every row.
fn parse(data: &str, columns: &[&str]) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| Error::Import(e.to_string()))?;
    if headers.iter().ne(columns.iter().copied()) {
        return Err(Error::Import(format!(
            "expected columns {}, got {}",
            columns.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Import(e.to_string()))?;
        if record.len() != columns.len() {
            return Err(Error::Import(format!(
                "expected {} fields, got {}",
                columns.len(),
                record.len()
            )));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| Error::Import(format!("bad date: {value}")))
}

fn parse_number(value: &str, field: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| Error::Import(format!("bad {field}: {value}")))
}

fn parse_optional_int(value: &str, field: &str) -> Result<Option<i32>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| Error::Import(format!("bad {field}: {value}")))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BodyStat, PersonalRecord, Profile, WorkoutLog};
    use chrono::Utc;

    fn overview() -> AccountOverview {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        AccountOverview {
            profile: Profile {
                id: "u1".to_string(),
                name: "Ana".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
                gender: "female".to_string(),
                goal: "hypertrophy".to_string(),
                avatar_url: None,
                level: 2,
                xp: 150,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            body_stats: vec![BodyStat {
                id: "s1".to_string(),
                user_id: "u1".to_string(),
                weight_kg: 62.5,
                height_cm: 168.0,
                date,
                created_at: Utc::now(),
            }],
            personal_records: vec![PersonalRecord {
                id: "r1".to_string(),
                user_id: "u1".to_string(),
                exercise_name: "Agachamento".to_string(),
                weight_kg: 80.0,
                date,
                created_at: Utc::now(),
            }],
            workout_logs: vec![WorkoutLog {
                id: "w1".to_string(),
                user_id: "u1".to_string(),
                workout_date: date,
                completed_exercises: vec![CompletedExercise {
                    name: "Agachamento".to_string(),
                    sets: 3,
                    reps: 10,
                    weight_kg: 80.0,
                }],
                notes: Some("boa sessão".to_string()),
                energy_level: Some(4),
                pain_level: None,
                created_at: Utc::now(),
            }],
            notes: vec![],
            achievements: vec![],
        }
    }

    #[test]
    fn test_export_headers_and_dates() {
        let export = export(&overview()).unwrap();

        let mut stats = export.stats.lines();
        assert_eq!(stats.next(), Some("date,weight_kg,height_cm"));
        assert_eq!(stats.next(), Some("2024-03-04,62.5,168"));

        let mut records = export.records.lines();
        assert_eq!(records.next(), Some("exercise_name,weight_kg,date"));
        assert_eq!(records.next(), Some("Agachamento,80,2024-03-04"));

        assert!(export.profile.lines().nth(1).unwrap().starts_with("Ana,1990-06-15,"));
    }

    #[test]
    fn test_export_embeds_completed_exercises_json() {
        let export = export(&overview()).unwrap();
        let row = export.workout_logs.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-03-04,"));
        assert!(row.contains("\"\"name\"\":\"\"Agachamento\"\""));
    }

    #[test]
    fn test_files_in_download_order() {
        let export = export(&overview()).unwrap();
        let names: Vec<_> = export.files().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![PROFILE_FILE, STATS_FILE, RECORDS_FILE, WORKOUT_LOGS_FILE]
        );
    }

    #[test]
    fn test_parse_rejects_wrong_header() {
        let err = parse("a,b\n1,2\n", &["date", "weight_kg", "height_cm"]).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_parse_date_and_numbers() {
        assert!(parse_date("2024-03-04").is_ok());
        assert!(parse_date("04/03/2024").is_err());
        assert!(parse_number("62.5", "weight_kg").is_ok());
        assert!(parse_number("heavy", "weight_kg").is_err());
        assert_eq!(parse_optional_int("", "energy_level").unwrap(), None);
        assert_eq!(parse_optional_int("4", "energy_level").unwrap(), Some(4));
    }
}
