//! Local gateway backed by sqlite.
//!
//! Emulates the hosted store closely enough for tests and offline use:
//! owner-scoped row access, session-token checks on owner-scoped calls,
//! last-write-wins updates, and a blob table standing in for file storage.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{Error, GatewayError, Result};
use crate::models::{
    Achievement, BodyStat, Exercise, ExercisePatch, FromSqliteRow, NewExercise, NewWorkoutLog,
    PersonalRecord, Profile, ProfileUpdate, Weekday, WorkoutLog, WorkoutNote,
};
use crate::session::{AuthUser, Identity};

use super::Gateway;

const SESSION_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SqliteGateway {
    pool: DbPool,
}

impl SqliteGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Gateway(GatewayError::Connection(e.to_string())))?
    }
}

/// Reject calls whose session token is missing, mismatched, or expired,
/// the way the hosted gateway's row-level policy would.
fn authorize(conn: &Connection, owner: &AuthUser) -> Result<()> {
    let expires_at: Option<chrono::DateTime<Utc>> = conn
        .query_row(
            "SELECT expires_at FROM sessions WHERE token = ? AND user_id = ?",
            rusqlite::params![owner.access_token, owner.id],
            |row| row.get(0),
        )
        .optional()?;

    match expires_at {
        Some(expires_at) if expires_at > Utc::now() => Ok(()),
        Some(_) => {
            // Lazily drop the expired session
            conn.execute(
                "DELETE FROM sessions WHERE token = ?",
                [&owner.access_token],
            )?;
            Err(Error::rejected(401, "invalid or expired session"))
        }
        None => Err(Error::rejected(401, "invalid or expired session")),
    }
}

fn create_session(conn: &Connection, user_id: &str) -> Result<String> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(SESSION_TTL_DAYS);
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        rusqlite::params![token, user_id, now, expires_at],
    )?;
    Ok(token)
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = email.trim().to_lowercase();
        let password_hash = hash_password(password)?;

        self.run(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM users WHERE email = ?",
                [&email],
                |row| row.get(0),
            )?;
            if exists {
                return Err(Error::rejected(422, "email already registered"));
            }

            let id = Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params![id, email, password_hash, now],
            )?;
            // The hosted service provisions an empty profile on signup
            conn.execute(
                "INSERT INTO profiles (id, created_at, updated_at) VALUES (?, ?, ?)",
                rusqlite::params![id, now, now],
            )?;

            let access_token = create_session(conn, &id)?;
            Ok(AuthUser {
                id,
                email,
                access_token,
            })
        })
        .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = email.trim().to_lowercase();
        let password = password.to_string();

        self.run(move |conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT id, password_hash FROM users WHERE email = ?",
                    [&email],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let (id, password_hash) = match row {
                Some(row) => row,
                None => return Err(Error::rejected(400, "invalid login credentials")),
            };
            if !verify_password(&password, &password_hash)? {
                return Err(Error::rejected(400, "invalid login credentials"));
            }

            let access_token = create_session(conn, &id)?;
            Ok(AuthUser {
                id,
                email,
                access_token,
            })
        })
        .await
    }

    async fn sign_out(&self, user: &AuthUser) -> Result<()> {
        let token = user.access_token.clone();
        self.run(move |conn| {
            conn.execute("DELETE FROM sessions WHERE token = ?", [&token])?;
            Ok(())
        })
        .await
    }

    async fn list_exercises(&self, scope: &Identity, day: Weekday) -> Result<Vec<Exercise>> {
        let owner = scope.authenticated().cloned();

        self.run(move |conn| {
            let exercises = match &owner {
                Some(user) => {
                    authorize(conn, user)?;
                    let mut stmt = conn.prepare(
                        "SELECT * FROM exercises WHERE user_id = ? AND day = ?
                         ORDER BY created_at, rowid",
                    )?;
                    let rows = stmt
                        .query_map(rusqlite::params![user.id, day.as_str()], Exercise::from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM exercises WHERE user_id IS NULL AND day = ?
                         ORDER BY created_at, rowid",
                    )?;
                    let rows = stmt
                        .query_map([day.as_str()], Exercise::from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            Ok(exercises)
        })
        .await
    }

    async fn insert_exercise(&self, owner: &AuthUser, data: &NewExercise) -> Result<Exercise> {
        let owner = owner.clone();
        let exercise = Exercise {
            id: Uuid::new_v4().to_string(),
            user_id: Some(owner.id.clone()),
            name: data.name.clone(),
            category: data.category.clone(),
            sets: data.sets,
            reps: data.reps,
            weight: data.weight,
            day: data.day,
            created_at: Utc::now(),
        };
        let exercise_clone = exercise.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO exercises (id, user_id, name, category, sets, reps, weight, day, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    exercise_clone.id,
                    exercise_clone.user_id,
                    exercise_clone.name,
                    exercise_clone.category,
                    exercise_clone.sets,
                    exercise_clone.reps,
                    exercise_clone.weight,
                    exercise_clone.day.as_str(),
                    exercise_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(exercise)
    }

    async fn update_exercise(
        &self,
        owner: &AuthUser,
        id: &str,
        patch: &ExercisePatch,
    ) -> Result<Option<Weekday>> {
        let owner = owner.clone();
        let id = id.to_string();
        let patch = patch.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            let day: Option<String> = conn
                .query_row(
                    "SELECT day FROM exercises WHERE id = ? AND user_id = ?",
                    rusqlite::params![id, owner.id],
                    |row| row.get(0),
                )
                .optional()?;
            let day = match day.as_deref().and_then(Weekday::parse) {
                Some(day) => day,
                None => return Ok(None),
            };

            conn.execute(
                "UPDATE exercises SET
                     name = COALESCE(?1, name),
                     category = COALESCE(?2, category),
                     sets = COALESCE(?3, sets),
                     reps = COALESCE(?4, reps),
                     weight = COALESCE(?5, weight)
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    patch.name, patch.category, patch.sets, patch.reps, patch.weight, id, owner.id
                ],
            )?;
            Ok(Some(day))
        })
        .await
    }

    async fn delete_exercise(&self, owner: &AuthUser, id: &str) -> Result<Option<Weekday>> {
        let owner = owner.clone();
        let id = id.to_string();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            let day: Option<String> = conn
                .query_row(
                    "SELECT day FROM exercises WHERE id = ? AND user_id = ?",
                    rusqlite::params![id, owner.id],
                    |row| row.get(0),
                )
                .optional()?;
            let day = match day.as_deref().and_then(Weekday::parse) {
                Some(day) => day,
                None => return Ok(None),
            };

            conn.execute(
                "DELETE FROM exercises WHERE id = ? AND user_id = ?",
                rusqlite::params![id, owner.id],
            )?;
            Ok(Some(day))
        })
        .await
    }

    async fn fetch_profile(&self, owner: &AuthUser) -> Result<Profile> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare("SELECT * FROM profiles WHERE id = ?")?;
            stmt.query_row([&owner.id], Profile::from_row)
                .optional()?
                .ok_or_else(|| Error::NotFound("profile".to_string()))
        })
        .await
    }

    async fn update_profile(&self, owner: &AuthUser, update: &ProfileUpdate) -> Result<()> {
        let owner = owner.clone();
        let update = update.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "UPDATE profiles SET
                     name = COALESCE(?1, name),
                     birth_date = COALESCE(?2, birth_date),
                     gender = COALESCE(?3, gender),
                     goal = COALESCE(?4, goal),
                     avatar_url = COALESCE(?5, avatar_url),
                     updated_at = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    update.name,
                    update.birth_date,
                    update.gender,
                    update.goal,
                    update.avatar_url,
                    Utc::now(),
                    owner.id
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_body_stats(&self, owner: &AuthUser) -> Result<Vec<BodyStat>> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare(
                "SELECT * FROM body_stats WHERE user_id = ? ORDER BY date, created_at, rowid",
            )?;
            let stats = stmt
                .query_map([&owner.id], BodyStat::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(stats)
        })
        .await
    }

    async fn insert_body_stat(
        &self,
        owner: &AuthUser,
        weight_kg: f64,
        height_cm: f64,
    ) -> Result<BodyStat> {
        let owner = owner.clone();
        let now = Utc::now();
        let stat = BodyStat {
            id: Uuid::new_v4().to_string(),
            user_id: owner.id.clone(),
            weight_kg,
            height_cm,
            date: now.date_naive(),
            created_at: now,
        };
        let stat_clone = stat.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO body_stats (id, user_id, weight_kg, height_cm, date, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    stat_clone.id,
                    stat_clone.user_id,
                    stat_clone.weight_kg,
                    stat_clone.height_cm,
                    stat_clone.date,
                    stat_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(stat)
    }

    async fn delete_body_stats(&self, owner: &AuthUser) -> Result<()> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute("DELETE FROM body_stats WHERE user_id = ?", [&owner.id])?;
            Ok(())
        })
        .await
    }

    async fn list_personal_records(&self, owner: &AuthUser) -> Result<Vec<PersonalRecord>> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare(
                "SELECT * FROM personal_records WHERE user_id = ? ORDER BY date DESC, rowid DESC",
            )?;
            let records = stmt
                .query_map([&owner.id], PersonalRecord::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn insert_personal_record(
        &self,
        owner: &AuthUser,
        exercise_name: &str,
        weight_kg: f64,
        date: NaiveDate,
    ) -> Result<PersonalRecord> {
        let owner = owner.clone();
        let record = PersonalRecord {
            id: Uuid::new_v4().to_string(),
            user_id: owner.id.clone(),
            exercise_name: exercise_name.to_string(),
            weight_kg,
            date,
            created_at: Utc::now(),
        };
        let record_clone = record.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO personal_records (id, user_id, exercise_name, weight_kg, date, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    record_clone.id,
                    record_clone.user_id,
                    record_clone.exercise_name,
                    record_clone.weight_kg,
                    record_clone.date,
                    record_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(record)
    }

    async fn delete_personal_records(&self, owner: &AuthUser) -> Result<()> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute("DELETE FROM personal_records WHERE user_id = ?", [&owner.id])?;
            Ok(())
        })
        .await
    }

    async fn list_workout_logs(&self, owner: &AuthUser) -> Result<Vec<WorkoutLog>> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_logs WHERE user_id = ?
                 ORDER BY workout_date DESC, rowid DESC",
            )?;
            let logs = stmt
                .query_map([&owner.id], WorkoutLog::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
        .await
    }

    async fn insert_workout_log(
        &self,
        owner: &AuthUser,
        log: &NewWorkoutLog,
    ) -> Result<WorkoutLog> {
        let owner = owner.clone();
        let completed_json = serde_json::to_string(&log.completed_exercises)
            .map_err(|e| Error::Gateway(e.into()))?;
        let log = WorkoutLog {
            id: Uuid::new_v4().to_string(),
            user_id: owner.id.clone(),
            workout_date: log.workout_date,
            completed_exercises: log.completed_exercises.clone(),
            notes: log.notes.clone(),
            energy_level: log.energy_level,
            pain_level: log.pain_level,
            created_at: Utc::now(),
        };
        let log_clone = log.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO workout_logs
                     (id, user_id, workout_date, completed_exercises, notes, energy_level, pain_level, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    log_clone.id,
                    log_clone.user_id,
                    log_clone.workout_date,
                    completed_json,
                    log_clone.notes,
                    log_clone.energy_level,
                    log_clone.pain_level,
                    log_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(log)
    }

    async fn delete_workout_logs(&self, owner: &AuthUser) -> Result<()> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute("DELETE FROM workout_logs WHERE user_id = ?", [&owner.id])?;
            Ok(())
        })
        .await
    }

    async fn list_workout_notes(&self, owner: &AuthUser) -> Result<Vec<WorkoutNote>> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare(
                "SELECT * FROM workout_notes WHERE user_id = ?
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let notes = stmt
                .query_map([&owner.id], WorkoutNote::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(notes)
        })
        .await
    }

    async fn insert_workout_note(&self, owner: &AuthUser, content: &str) -> Result<WorkoutNote> {
        let owner = owner.clone();
        let note = WorkoutNote {
            id: Uuid::new_v4().to_string(),
            user_id: owner.id.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let note_clone = note.clone();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO workout_notes (id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params![
                    note_clone.id,
                    note_clone.user_id,
                    note_clone.content,
                    note_clone.created_at
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(note)
    }

    async fn list_achievements(&self, owner: &AuthUser) -> Result<Vec<Achievement>> {
        let owner = owner.clone();
        self.run(move |conn| {
            authorize(conn, &owner)?;
            let mut stmt = conn.prepare(
                "SELECT * FROM achievements WHERE user_id = ? ORDER BY achieved_at DESC",
            )?;
            let achievements = stmt
                .query_map([&owner.id], Achievement::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(achievements)
        })
        .await
    }

    async fn insert_achievement(
        &self,
        owner: &AuthUser,
        achievement_type: &str,
    ) -> Result<Achievement> {
        let owner = owner.clone();
        let achievement_type = achievement_type.to_string();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            // Unlock rows are append-only; re-unlocking is a no-op
            conn.execute(
                "INSERT INTO achievements (id, user_id, achievement_type, achieved_at)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(user_id, achievement_type) DO NOTHING",
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    owner.id,
                    achievement_type,
                    Utc::now()
                ],
            )?;
            let mut stmt = conn
                .prepare("SELECT * FROM achievements WHERE user_id = ? AND achievement_type = ?")?;
            let achievement = stmt.query_row(
                rusqlite::params![owner.id, achievement_type],
                Achievement::from_row,
            )?;
            Ok(achievement)
        })
        .await
    }

    async fn upload_avatar(
        &self,
        owner: &AuthUser,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let owner = owner.clone();
        let file_name = file_name.to_string();
        let content_type = content_type.to_string();

        self.run(move |conn| {
            authorize(conn, &owner)?;
            conn.execute(
                "INSERT INTO avatars (file_name, user_id, content, content_type, uploaded_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(file_name) DO UPDATE SET
                     content = excluded.content,
                     content_type = excluded.content_type,
                     uploaded_at = excluded.uploaded_at",
                rusqlite::params![file_name, owner.id, bytes, content_type, Utc::now()],
            )?;
            Ok(format!("local://avatars/{file_name}"))
        })
        .await
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Gateway(GatewayError::Connection(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Gateway(GatewayError::Decode(e.to_string())))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
