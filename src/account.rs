//! Profile and progress operations for the signed-in user.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::models::{
    Achievement, BodyStat, NewWorkoutLog, PersonalRecord, Profile, ProfileEdit, ProfileUpdate,
    WorkoutLog, WorkoutNote,
};
use crate::session::Identity;

/// Everything the profile page shows, loaded in one call.
#[derive(Debug, Clone)]
pub struct AccountOverview {
    pub profile: Profile,
    /// Date ascending
    pub body_stats: Vec<BodyStat>,
    /// Date descending
    pub personal_records: Vec<PersonalRecord>,
    /// Workout date descending
    pub workout_logs: Vec<WorkoutLog>,
    pub notes: Vec<WorkoutNote>,
    pub achievements: Vec<Achievement>,
}

pub struct AccountService {
    gateway: Arc<dyn Gateway>,
    identity: Identity,
}

impl AccountService {
    pub fn new(gateway: Arc<dyn Gateway>, identity: Identity) -> Self {
        Self { gateway, identity }
    }

    pub async fn overview(&self) -> Result<AccountOverview> {
        let owner = self.identity.require_auth()?;

        let profile = self.gateway.fetch_profile(owner).await?;
        let body_stats = self.gateway.list_body_stats(owner).await?;
        let personal_records = self.gateway.list_personal_records(owner).await?;
        let workout_logs = self.gateway.list_workout_logs(owner).await?;
        let notes = self.gateway.list_workout_notes(owner).await?;
        let achievements = self.gateway.list_achievements(owner).await?;

        Ok(AccountOverview {
            profile,
            body_stats,
            personal_records,
            workout_logs,
            notes,
            achievements,
        })
    }

    /// Applies the personal-information form. A supplied weight or height
    /// appends a new body-stat measurement; the missing half of the pair is
    /// carried forward from the latest one.
    pub async fn update_profile(&self, edit: ProfileEdit) -> Result<()> {
        let owner = self.identity.require_auth()?;

        let update = ProfileUpdate {
            name: edit.name,
            birth_date: edit.birth_date,
            gender: edit.gender,
            goal: edit.goal,
            avatar_url: None,
        };
        self.gateway.update_profile(owner, &update).await?;

        if edit.weight_kg.is_some() || edit.height_cm.is_some() {
            let latest = self.gateway.list_body_stats(owner).await?.pop();
            let weight_kg = edit
                .weight_kg
                .or_else(|| latest.as_ref().map(|s| s.weight_kg));
            let height_cm = edit
                .height_cm
                .or_else(|| latest.as_ref().map(|s| s.height_cm));
            match (weight_kg, height_cm) {
                (Some(weight_kg), Some(height_cm)) => {
                    self.gateway
                        .insert_body_stat(owner, weight_kg, height_cm)
                        .await?;
                }
                _ => {
                    return Err(Error::Validation(
                        "both weight and height are required for the first measurement"
                            .to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    /// Uploads a new avatar and persists its public URL on the profile.
    /// Returns the URL.
    pub async fn set_avatar(
        &self,
        file_ext: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let owner = self.identity.require_auth()?;

        let file_name = format!("{}-avatar.{}", owner.id, file_ext);
        let url = self
            .gateway
            .upload_avatar(owner, &file_name, bytes, content_type)
            .await?;

        let update = ProfileUpdate {
            avatar_url: Some(url.clone()),
            ..Default::default()
        };
        self.gateway.update_profile(owner, &update).await?;

        Ok(url)
    }

    pub async fn add_note(&self, content: &str) -> Result<WorkoutNote> {
        let owner = self.identity.require_auth()?;

        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation("note content is required".to_string()));
        }
        self.gateway.insert_workout_note(owner, content).await
    }

    pub async fn log_workout(&self, log: NewWorkoutLog) -> Result<WorkoutLog> {
        let owner = self.identity.require_auth()?;
        self.gateway.insert_workout_log(owner, &log).await
    }

    /// Wipes body stats, personal records, and workout logs. Notes, the
    /// profile, and unlocked achievements are kept.
    pub async fn clear_progress(&self) -> Result<()> {
        let owner = self.identity.require_auth()?;

        self.gateway.delete_body_stats(owner).await?;
        self.gateway.delete_personal_records(owner).await?;
        self.gateway.delete_workout_logs(owner).await?;
        tracing::info!("Cleared progress for {}", owner.id);
        Ok(())
    }
}
