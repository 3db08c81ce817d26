//! Per-day exercise cache.
//!
//! Maps a weekday to its most recently fetched exercise list for one owner
//! scope, and applies create/update/delete with invalidate-then-refetch
//! consistency. The gateway is the sole source of truth: there is no retry
//! and no conflict resolution beyond last-write-wins at the gateway.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::gateway::Gateway;
use crate::models::{Exercise, ExercisePatch, NewExercise, Weekday};
use crate::session::Identity;

/// A cache instance is bound to one identity; build a fresh one after
/// sign-in or sign-out so entries from different owner scopes never mix.
pub struct RoutineCache {
    gateway: Arc<dyn Gateway>,
    identity: Identity,
    entries: RwLock<HashMap<Weekday, Vec<Exercise>>>,
}

impl RoutineCache {
    pub fn new(gateway: Arc<dyn Gateway>, identity: Identity) -> Self {
        Self {
            gateway,
            identity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The exercise list for a weekday, creation-time ascending. Serves the
    /// cached entry when present, otherwise fetches from the gateway.
    pub async fn fetch(&self, day: Weekday) -> Result<Vec<Exercise>> {
        if let Some(cached) = self.entries.read().await.get(&day) {
            return Ok(cached.clone());
        }
        self.refetch(day).await
    }

    /// Creates an exercise for the authenticated owner, then invalidates and
    /// refetches its weekday so subsequent fetches see the new row.
    pub async fn create(&self, data: NewExercise) -> Result<Exercise> {
        let owner = self.identity.require_auth()?;
        data.validate()?;

        let exercise = self.gateway.insert_exercise(owner, &data).await?;
        self.refetch(data.day).await?;
        Ok(exercise)
    }

    /// Applies a partial update to an owned exercise. The gateway's row
    /// policy decides ownership; a mutation matching no owned row surfaces
    /// as `NotFound`.
    pub async fn update(&self, id: &str, patch: ExercisePatch) -> Result<()> {
        let owner = self.identity.require_auth()?;
        patch.validate()?;
        if patch.is_empty() {
            return Ok(());
        }

        match self.gateway.update_exercise(owner, id, &patch).await? {
            Some(day) => {
                self.refetch(day).await?;
                Ok(())
            }
            None => Err(Error::NotFound(format!("exercise {id}"))),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let owner = self.identity.require_auth()?;

        match self.gateway.delete_exercise(owner, id).await? {
            Some(day) => {
                self.refetch(day).await?;
                Ok(())
            }
            None => Err(Error::NotFound(format!("exercise {id}"))),
        }
    }

    pub async fn invalidate(&self, day: Weekday) {
        self.entries.write().await.remove(&day);
        tracing::debug!("Invalidated routine cache for {}", day.as_str());
    }

    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    /// Weekdays that currently have at least one exercise. Fetches every
    /// day, warming the whole cache.
    pub async fn planned_days(&self) -> Result<Vec<Weekday>> {
        let mut days = Vec::new();
        for day in Weekday::ALL {
            if !self.fetch(day).await?.is_empty() {
                days.push(day);
            }
        }
        Ok(days)
    }

    async fn refetch(&self, day: Weekday) -> Result<Vec<Exercise>> {
        let exercises = self.gateway.list_exercises(&self.identity, day).await?;
        self.entries.write().await.insert(day, exercises.clone());
        Ok(exercises)
    }
}
