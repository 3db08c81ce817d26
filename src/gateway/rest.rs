//! Gateway implementation against the hosted backend service.
//!
//! The service exposes three surfaces under one base URL: `/auth/v1` for the
//! token exchange, `/rest/v1` for row-level CRUD with equality filters in the
//! query string, and `/storage/v1` for file uploads. Every request carries
//! the project key; authenticated requests add the session token as a bearer.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    Achievement, BodyStat, Exercise, ExercisePatch, NewExercise, NewWorkoutLog, PersonalRecord,
    Profile, ProfileUpdate, Weekday, WorkoutLog, WorkoutNote,
};
use crate::session::{AuthUser, Identity};

use super::Gateway;

const AVATAR_BUCKET: &str = "avatars";

pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.gateway_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn object_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, AVATAR_BUCKET, file_name
        )
    }

    fn public_object_url(&self, file_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, AVATAR_BUCKET, file_name
        )
    }

    /// Bearer token for the request: the session token when signed in, the
    /// project key otherwise.
    fn bearer(&self, scope: &Identity) -> String {
        match scope {
            Identity::Authenticated(user) => user.access_token.clone(),
            Identity::Anonymous => self.api_key.clone(),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        token: &str,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {token}"))
    }

    async fn rows<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Vec<T>> {
        let response = builder.send().await?;
        let response = expect_success(response).await?;
        Ok(response.json().await?)
    }

    /// Sends an insert and returns the representation of the created row.
    async fn insert_returning<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        owner: &AuthUser,
        body: &impl Serialize,
    ) -> Result<T> {
        let rows: Vec<T> = self
            .rows(
                self.request(reqwest::Method::POST, self.table_url(table), &owner.access_token)
                    .header("Prefer", "return=representation")
                    .json(body),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("inserted {table} row")))
    }

    async fn delete_owned(&self, table: &str, owner: &AuthUser) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, self.table_url(table), &owner.access_token)
            .query(&[("user_id", format!("eq.{}", owner.id))])
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn exchange(&self, url: String, body: &serde_json::Value) -> Result<AuthUser> {
        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;
        let response = expect_success(response).await?;
        let session: AuthSession = response.json().await?;
        Ok(AuthUser {
            id: session.user.id,
            email: session.user.email,
            access_token: session.access_token,
        })
    }
}

#[derive(Deserialize)]
struct AuthSession {
    access_token: String,
    user: AuthUserBody,
}

#[derive(Deserialize)]
struct AuthUserBody {
    id: String,
    email: String,
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);
    Err(Error::rejected(status.as_u16(), message))
}

/// Pulls the human-readable message out of an error body, which the three
/// service surfaces spell differently.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(str::to_string))
}

#[derive(Serialize)]
struct OwnedInsert<'a, T: Serialize> {
    user_id: &'a str,
    #[serde(flatten)]
    data: &'a T,
}

#[async_trait]
impl Gateway for RestGateway {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.exchange(
            self.auth_url("signup"),
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.exchange(
            format!("{}?grant_type=password", self.auth_url("token")),
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_out(&self, user: &AuthUser) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, self.auth_url("logout"), &user.access_token)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn list_exercises(&self, scope: &Identity, day: Weekday) -> Result<Vec<Exercise>> {
        let owner_filter = match scope.owner_id() {
            Some(id) => format!("eq.{id}"),
            None => "is.null".to_string(),
        };
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("exercises"),
                &self.bearer(scope),
            )
            .query(&[
                ("select", "*".to_string()),
                ("day", format!("eq.{}", day.as_str())),
                ("user_id", owner_filter),
                ("order", "created_at.asc".to_string()),
            ]),
        )
        .await
    }

    async fn insert_exercise(&self, owner: &AuthUser, data: &NewExercise) -> Result<Exercise> {
        self.insert_returning(
            "exercises",
            owner,
            &OwnedInsert {
                user_id: &owner.id,
                data,
            },
        )
        .await
    }

    async fn update_exercise(
        &self,
        owner: &AuthUser,
        id: &str,
        patch: &ExercisePatch,
    ) -> Result<Option<Weekday>> {
        // An empty patch would serialize to an empty PATCH body, which the
        // service rejects. Resolve the row's day with a read instead.
        if patch.is_empty() {
            let rows: Vec<Exercise> = self
                .rows(
                    self.request(
                        reqwest::Method::GET,
                        self.table_url("exercises"),
                        &owner.access_token,
                    )
                    .query(&[
                        ("select", "*".to_string()),
                        ("id", format!("eq.{id}")),
                        ("user_id", format!("eq.{}", owner.id)),
                    ]),
                )
                .await?;
            return Ok(rows.into_iter().next().map(|row| row.day));
        }

        let rows: Vec<Exercise> = self
            .rows(
                self.request(
                    reqwest::Method::PATCH,
                    self.table_url("exercises"),
                    &owner.access_token,
                )
                .query(&[
                    ("id", format!("eq.{id}")),
                    ("user_id", format!("eq.{}", owner.id)),
                ])
                .header("Prefer", "return=representation")
                .json(patch),
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.day))
    }

    async fn delete_exercise(&self, owner: &AuthUser, id: &str) -> Result<Option<Weekday>> {
        let rows: Vec<Exercise> = self
            .rows(
                self.request(
                    reqwest::Method::DELETE,
                    self.table_url("exercises"),
                    &owner.access_token,
                )
                .query(&[
                    ("id", format!("eq.{id}")),
                    ("user_id", format!("eq.{}", owner.id)),
                ])
                .header("Prefer", "return=representation"),
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.day))
    }

    async fn fetch_profile(&self, owner: &AuthUser) -> Result<Profile> {
        let rows: Vec<Profile> = self
            .rows(
                self.request(
                    reqwest::Method::GET,
                    self.table_url("profiles"),
                    &owner.access_token,
                )
                .query(&[("select", "*".to_string()), ("id", format!("eq.{}", owner.id))]),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("profile {}", owner.id)))
    }

    async fn update_profile(&self, owner: &AuthUser, update: &ProfileUpdate) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::PATCH,
                self.table_url("profiles"),
                &owner.access_token,
            )
            .query(&[("id", format!("eq.{}", owner.id))])
            .json(update)
            .send()
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn list_body_stats(&self, owner: &AuthUser) -> Result<Vec<BodyStat>> {
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("body_stats"),
                &owner.access_token,
            )
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner.id)),
                ("order", "date.asc".to_string()),
            ]),
        )
        .await
    }

    async fn insert_body_stat(
        &self,
        owner: &AuthUser,
        weight_kg: f64,
        height_cm: f64,
    ) -> Result<BodyStat> {
        self.insert_returning(
            "body_stats",
            owner,
            &serde_json::json!({
                "user_id": owner.id,
                "weight_kg": weight_kg,
                "height_cm": height_cm,
                "date": Utc::now().date_naive(),
            }),
        )
        .await
    }

    async fn delete_body_stats(&self, owner: &AuthUser) -> Result<()> {
        self.delete_owned("body_stats", owner).await
    }

    async fn list_personal_records(&self, owner: &AuthUser) -> Result<Vec<PersonalRecord>> {
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("personal_records"),
                &owner.access_token,
            )
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner.id)),
                ("order", "date.desc".to_string()),
            ]),
        )
        .await
    }

    async fn insert_personal_record(
        &self,
        owner: &AuthUser,
        exercise_name: &str,
        weight_kg: f64,
        date: chrono::NaiveDate,
    ) -> Result<PersonalRecord> {
        self.insert_returning(
            "personal_records",
            owner,
            &serde_json::json!({
                "user_id": owner.id,
                "exercise_name": exercise_name,
                "weight_kg": weight_kg,
                "date": date,
            }),
        )
        .await
    }

    async fn delete_personal_records(&self, owner: &AuthUser) -> Result<()> {
        self.delete_owned("personal_records", owner).await
    }

    async fn list_workout_logs(&self, owner: &AuthUser) -> Result<Vec<WorkoutLog>> {
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("workout_logs"),
                &owner.access_token,
            )
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner.id)),
                ("order", "workout_date.desc".to_string()),
            ]),
        )
        .await
    }

    async fn insert_workout_log(
        &self,
        owner: &AuthUser,
        log: &NewWorkoutLog,
    ) -> Result<WorkoutLog> {
        self.insert_returning(
            "workout_logs",
            owner,
            &OwnedInsert {
                user_id: &owner.id,
                data: log,
            },
        )
        .await
    }

    async fn delete_workout_logs(&self, owner: &AuthUser) -> Result<()> {
        self.delete_owned("workout_logs", owner).await
    }

    async fn list_workout_notes(&self, owner: &AuthUser) -> Result<Vec<WorkoutNote>> {
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("workout_notes"),
                &owner.access_token,
            )
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner.id)),
                ("order", "created_at.desc".to_string()),
            ]),
        )
        .await
    }

    async fn insert_workout_note(&self, owner: &AuthUser, content: &str) -> Result<WorkoutNote> {
        self.insert_returning(
            "workout_notes",
            owner,
            &serde_json::json!({ "user_id": owner.id, "content": content }),
        )
        .await
    }

    async fn list_achievements(&self, owner: &AuthUser) -> Result<Vec<Achievement>> {
        self.rows(
            self.request(
                reqwest::Method::GET,
                self.table_url("achievements"),
                &owner.access_token,
            )
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", owner.id)),
            ]),
        )
        .await
    }

    async fn insert_achievement(
        &self,
        owner: &AuthUser,
        achievement_type: &str,
    ) -> Result<Achievement> {
        // Upsert so re-evaluating history never duplicates an unlock.
        let rows: Vec<Achievement> = self
            .rows(
                self.request(
                    reqwest::Method::POST,
                    self.table_url("achievements"),
                    &owner.access_token,
                )
                .query(&[("on_conflict", "user_id,achievement_type")])
                .header("Prefer", "return=representation,resolution=merge-duplicates")
                .json(&serde_json::json!({
                    "user_id": owner.id,
                    "achievement_type": achievement_type,
                })),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("achievement {achievement_type}")))
    }

    async fn upload_avatar(
        &self,
        owner: &AuthUser,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let response = self
            .request(
                reqwest::Method::POST,
                self.object_url(file_name),
                &owner.access_token,
            )
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        expect_success(response).await?;
        tracing::info!("Uploaded avatar {}", file_name);
        Ok(self.public_object_url(file_name))
    }
}
