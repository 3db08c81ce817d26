//! The remote data gateway boundary.
//!
//! Everything the app persists lives behind the [`Gateway`] trait: row-level
//! CRUD over the fitness tables, the session-token auth exchange, and avatar
//! uploads. [`RestGateway`] speaks to the hosted service;
//! [`SqliteGateway`] emulates it locally for tests and offline use.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Achievement, BodyStat, Exercise, ExercisePatch, NewExercise, NewWorkoutLog, PersonalRecord,
    Profile, ProfileUpdate, Weekday, WorkoutLog, WorkoutNote,
};
use crate::session::{AuthUser, Identity};

mod rest;
mod sqlite;

pub use rest::RestGateway;
pub use sqlite::SqliteGateway;

#[async_trait]
pub trait Gateway: Send + Sync {
    // Auth
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;
    async fn sign_out(&self, user: &AuthUser) -> Result<()>;

    // Exercises, filtered by equality predicates on weekday and owner,
    // ordered by creation time ascending.
    async fn list_exercises(&self, scope: &Identity, day: Weekday) -> Result<Vec<Exercise>>;
    async fn insert_exercise(&self, owner: &AuthUser, data: &NewExercise) -> Result<Exercise>;
    /// Returns the weekday of the updated row, or `None` when no row matched
    /// the (id, owner) pair.
    async fn update_exercise(
        &self,
        owner: &AuthUser,
        id: &str,
        patch: &ExercisePatch,
    ) -> Result<Option<Weekday>>;
    /// Returns the weekday of the deleted row, or `None` when no row matched.
    async fn delete_exercise(&self, owner: &AuthUser, id: &str) -> Result<Option<Weekday>>;

    // Profile
    async fn fetch_profile(&self, owner: &AuthUser) -> Result<Profile>;
    async fn update_profile(&self, owner: &AuthUser, update: &ProfileUpdate) -> Result<()>;

    // Body stats, ordered by date ascending
    async fn list_body_stats(&self, owner: &AuthUser) -> Result<Vec<BodyStat>>;
    async fn insert_body_stat(
        &self,
        owner: &AuthUser,
        weight_kg: f64,
        height_cm: f64,
    ) -> Result<BodyStat>;
    async fn delete_body_stats(&self, owner: &AuthUser) -> Result<()>;

    // Personal records, ordered by date descending
    async fn list_personal_records(&self, owner: &AuthUser) -> Result<Vec<PersonalRecord>>;
    async fn insert_personal_record(
        &self,
        owner: &AuthUser,
        exercise_name: &str,
        weight_kg: f64,
        date: chrono::NaiveDate,
    ) -> Result<PersonalRecord>;
    async fn delete_personal_records(&self, owner: &AuthUser) -> Result<()>;

    // Workout logs, ordered by workout date descending
    async fn list_workout_logs(&self, owner: &AuthUser) -> Result<Vec<WorkoutLog>>;
    async fn insert_workout_log(&self, owner: &AuthUser, log: &NewWorkoutLog)
        -> Result<WorkoutLog>;
    async fn delete_workout_logs(&self, owner: &AuthUser) -> Result<()>;

    // Diary notes
    async fn list_workout_notes(&self, owner: &AuthUser) -> Result<Vec<WorkoutNote>>;
    async fn insert_workout_note(&self, owner: &AuthUser, content: &str) -> Result<WorkoutNote>;

    // Achievements (append-only unlock rows)
    async fn list_achievements(&self, owner: &AuthUser) -> Result<Vec<Achievement>>;
    async fn insert_achievement(
        &self,
        owner: &AuthUser,
        achievement_type: &str,
    ) -> Result<Achievement>;

    // File storage; returns the public URL of the uploaded avatar.
    async fn upload_avatar(
        &self,
        owner: &AuthUser,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}
