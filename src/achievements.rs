//! Achievement catalog and unlock evaluation.
//!
//! The catalog is static; unlock rows live at the gateway and are
//! append-only. Evaluation derives unlockable ids from workout history and
//! is idempotent: re-running it never produces duplicate unlocks.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::models::{PersonalRecord, Weekday, WorkoutLog, WorkoutNote};
use crate::session::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Frequency,
    Consistency,
    Evolution,
    Personalization,
    Secret,
}

impl AchievementCategory {
    pub fn title(&self) -> &'static str {
        match self {
            AchievementCategory::Frequency => "Conquistas de Frequência",
            AchievementCategory::Consistency => "Conquistas de Consistência",
            AchievementCategory::Evolution => "Conquistas de Evolução",
            AchievementCategory::Personalization => "Conquistas de Personalização",
            AchievementCategory::Secret => "Conquistas Secretas",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub category: AchievementCategory,
    pub title: &'static str,
    pub description: &'static str,
}

pub const CATALOG: &[AchievementDef] = &[
    AchievementDef {
        id: "first_week",
        category: AchievementCategory::Frequency,
        title: "Primeira Semana Completa",
        description: "Fez pelo menos 1 treino em cada dia planejado",
    },
    AchievementDef {
        id: "five_days",
        category: AchievementCategory::Frequency,
        title: "5 Dias Seguidos",
        description: "Treinou 5 dias consecutivos",
    },
    AchievementDef {
        id: "ten_workouts",
        category: AchievementCategory::Frequency,
        title: "10 Treinos Registrados",
        description: "10 treinos registrados",
    },
    AchievementDef {
        id: "thirty_workouts",
        category: AchievementCategory::Frequency,
        title: "30 Treinos Registrados",
        description: "30 treinos registrados",
    },
    AchievementDef {
        id: "hundred_workouts",
        category: AchievementCategory::Frequency,
        title: "100 Treinos no Total",
        description: "100 treinos no total",
    },
    AchievementDef {
        id: "one_month",
        category: AchievementCategory::Consistency,
        title: "1 Mês Sem Falhar",
        description: "Treinou pelo menos 3x por semana durante 4 semanas",
    },
    AchievementDef {
        id: "three_months",
        category: AchievementCategory::Consistency,
        title: "3 Meses Ativo",
        description: "3 meses ativos",
    },
    AchievementDef {
        id: "one_year",
        category: AchievementCategory::Consistency,
        title: "1 Ano de Registro",
        description: "1 ano de registros",
    },
    AchievementDef {
        id: "weight_increase",
        category: AchievementCategory::Evolution,
        title: "Aumentou Carga",
        description: "Aumentou carga em 3 exercícios",
    },
    AchievementDef {
        id: "1rm_improvement",
        category: AchievementCategory::Evolution,
        title: "Melhorou 1RM",
        description: "Melhorou 1RM em qualquer exercício",
    },
    AchievementDef {
        id: "ten_notes",
        category: AchievementCategory::Evolution,
        title: "10 Anotações",
        description: "Registrou 10 anotações no diário",
    },
    AchievementDef {
        id: "five_routines",
        category: AchievementCategory::Personalization,
        title: "5 Rotinas",
        description: "Criou 5 rotinas diferentes",
    },
    AchievementDef {
        id: "all_days",
        category: AchievementCategory::Personalization,
        title: "Todos os Dias",
        description: "Treinou em todos os dias da semana pelo menos uma vez",
    },
    AchievementDef {
        id: "reset_week",
        category: AchievementCategory::Personalization,
        title: "Reset com Foco",
        description: "Redefiniu a semana e recomeçou com foco",
    },
    AchievementDef {
        id: "sunday_warrior",
        category: AchievementCategory::Secret,
        title: "???",
        description: "???",
    },
    AchievementDef {
        id: "holiday_warrior",
        category: AchievementCategory::Secret,
        title: "???",
        description: "???",
    },
    AchievementDef {
        id: "comeback",
        category: AchievementCategory::Secret,
        title: "???",
        description: "???",
    },
];

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    CATALOG.iter().find(|def| def.id == id)
}

/// History snapshot the evaluation runs against.
pub struct History<'a> {
    pub logs: &'a [WorkoutLog],
    pub notes: &'a [WorkoutNote],
    pub records: &'a [PersonalRecord],
    /// Weekdays that currently have routine exercises
    pub planned_days: &'a [Weekday],
}

/// All achievement ids earned by this history. `reset_week` has no
/// derivation in the product and is never returned here.
pub fn evaluate(history: &History) -> Vec<&'static str> {
    let mut earned = Vec::new();

    let mut dates: Vec<NaiveDate> = history
        .logs
        .iter()
        .map(|log| log.workout_date)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    dates.sort_unstable();

    let log_weekdays: HashSet<Weekday> = dates.iter().map(|d| Weekday::from_date(*d)).collect();

    if history.logs.len() >= 10 {
        earned.push("ten_workouts");
    }
    if history.logs.len() >= 30 {
        earned.push("thirty_workouts");
    }
    if history.logs.len() >= 100 {
        earned.push("hundred_workouts");
    }

    if !history.planned_days.is_empty()
        && history
            .planned_days
            .iter()
            .all(|day| log_weekdays.contains(day))
    {
        earned.push("first_week");
    }

    if has_consecutive_run(&dates, 5) {
        earned.push("five_days");
    }

    if trained_three_times_weekly_for_four_weeks(&dates, history.logs) {
        earned.push("one_month");
    }

    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        let span = *last - *first;
        if span >= Duration::days(90) {
            earned.push("three_months");
        }
        if span >= Duration::days(365) {
            earned.push("one_year");
        }
    }

    let improved = exercises_with_improved_record(history.records);
    if improved >= 1 {
        earned.push("1rm_improvement");
    }
    if improved >= 3 {
        earned.push("weight_increase");
    }

    if history.notes.len() >= 10 {
        earned.push("ten_notes");
    }

    if history.planned_days.len() >= 5 {
        earned.push("five_routines");
    }
    if log_weekdays.len() == 7 {
        earned.push("all_days");
    }

    if log_weekdays.contains(&Weekday::Sunday) {
        earned.push("sunday_warrior");
    }
    if dates
        .iter()
        .any(|d| (d.month(), d.day()) == (12, 25) || (d.month(), d.day()) == (1, 1))
    {
        earned.push("holiday_warrior");
    }
    if has_comeback(&dates) {
        earned.push("comeback");
    }

    earned
}

/// `n` consecutive calendar days within the sorted distinct dates.
fn has_consecutive_run(dates: &[NaiveDate], n: usize) -> bool {
    if n <= 1 {
        return !dates.is_empty();
    }
    let mut run = 1;
    for pair in dates.windows(2) {
        if pair[1] - pair[0] == Duration::days(1) {
            run += 1;
            if run >= n {
                return true;
            }
        } else {
            run = 1;
        }
    }
    false
}

/// Four back-to-back 7-day windows each holding at least 3 workouts,
/// anchored at any workout date.
fn trained_three_times_weekly_for_four_weeks(dates: &[NaiveDate], logs: &[WorkoutLog]) -> bool {
    for start in dates {
        let four_weeks = (0..4).all(|week| {
            let from = *start + Duration::days(7 * week);
            let to = from + Duration::days(7);
            let count = logs
                .iter()
                .filter(|log| log.workout_date >= from && log.workout_date < to)
                .count();
            count >= 3
        });
        if four_weeks {
            return true;
        }
    }
    false
}

/// Exercises whose records show a strictly heavier lift on a later date.
fn exercises_with_improved_record(records: &[PersonalRecord]) -> usize {
    let names: HashSet<&str> = records.iter().map(|r| r.exercise_name.as_str()).collect();
    names
        .iter()
        .filter(|name| {
            let mut entries: Vec<_> = records
                .iter()
                .filter(|r| r.exercise_name == **name)
                .collect();
            entries.sort_by_key(|r| r.date);
            entries
                .windows(2)
                .any(|pair| pair[1].weight_kg > pair[0].weight_kg)
        })
        .count()
}

/// A workout after a break of more than 30 days.
fn has_comeback(dates: &[NaiveDate]) -> bool {
    dates
        .windows(2)
        .any(|pair| pair[1] - pair[0] > Duration::days(30))
}

/// Evaluates the current history and persists any unlock the user does not
/// have yet. Returns the newly unlocked ids.
pub struct AchievementEngine {
    gateway: Arc<dyn Gateway>,
    identity: Identity,
}

impl AchievementEngine {
    pub fn new(gateway: Arc<dyn Gateway>, identity: Identity) -> Self {
        Self { gateway, identity }
    }

    pub async fn sync(&self, planned_days: &[Weekday]) -> Result<Vec<&'static str>> {
        let owner = self.identity.require_auth()?;

        let logs = self.gateway.list_workout_logs(owner).await?;
        let notes = self.gateway.list_workout_notes(owner).await?;
        let records = self.gateway.list_personal_records(owner).await?;
        let existing: HashSet<String> = self
            .gateway
            .list_achievements(owner)
            .await?
            .into_iter()
            .map(|a| a.achievement_type)
            .collect();

        let earned = evaluate(&History {
            logs: &logs,
            notes: &notes,
            records: &records,
            planned_days,
        });

        let mut unlocked = Vec::new();
        for id in earned {
            if existing.contains(id) {
                continue;
            }
            self.gateway.insert_achievement(owner, id).await?;
            tracing::info!("Unlocked achievement: {}", id);
            unlocked.push(id);
        }
        Ok(unlocked)
    }
}
