//! Typed client for a personal fitness tracker backed by a hosted data
//! service.
//!
//! The crate covers the non-visual layers of the app: the [`gateway`]
//! boundary over the hosted service (with a local sqlite stand-in), the
//! per-weekday [`routine`] cache, profile and progress operations in
//! [`account`], achievement evaluation, derived profile [`metrics`], and
//! CSV [`export`]/import of the user's data.

pub mod account;
pub mod achievements;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod gateway;
pub mod metrics;
pub mod migrations;
pub mod models;
pub mod routine;
pub mod session;
pub mod theme;

pub use account::{AccountOverview, AccountService};
pub use achievements::AchievementEngine;
pub use config::Config;
pub use error::{Error, GatewayError, Result};
pub use gateway::{Gateway, RestGateway, SqliteGateway};
pub use routine::RoutineCache;
pub use session::{AuthUser, Identity};
pub use theme::{AppContext, ThemePreference};
