//! Derived metrics shown on the profile page.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use crate::models::{BodyStat, WorkoutLog};

/// Body-mass index from the latest measurement. `None` when there is no
/// measurement or the height is non-positive.
pub fn bmi(stats: &[BodyStat]) -> Option<f64> {
    let latest = stats.last()?;
    if latest.height_cm <= 0.0 {
        return None;
    }
    let height_m = latest.height_cm / 100.0;
    Some(latest.weight_kg / (height_m * height_m))
}

/// Whole years between the birth date and today.
pub fn age(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years
}

/// Number of distinct days with at least one logged workout.
pub fn workout_days(logs: &[WorkoutLog]) -> usize {
    logs.iter()
        .map(|log| log.workout_date)
        .collect::<HashSet<_>>()
        .len()
}

pub fn current_weight(stats: &[BodyStat]) -> Option<f64> {
    stats.last().map(|stat| stat.weight_kg)
}

pub fn current_height(stats: &[BodyStat]) -> Option<f64> {
    stats.last().map(|stat| stat.height_cm)
}

/// Percent progress into the current level (100 xp per level).
pub fn level_progress(xp: i32) -> i32 {
    xp.rem_euclid(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::CompletedExercise;

    fn stat(weight_kg: f64, height_cm: f64, date: NaiveDate) -> BodyStat {
        BodyStat {
            id: "s".to_string(),
            user_id: "u".to_string(),
            weight_kg,
            height_cm,
            date,
            created_at: Utc::now(),
        }
    }

    fn log(date: NaiveDate) -> WorkoutLog {
        WorkoutLog {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u".to_string(),
            workout_date: date,
            completed_exercises: vec![CompletedExercise {
                name: "Agachamento".to_string(),
                sets: 3,
                reps: 10,
                weight_kg: 60.0,
            }],
            notes: None,
            energy_level: None,
            pain_level: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bmi_uses_latest_stat() {
        let stats = vec![
            stat(90.0, 175.0, date(2024, 1, 1)),
            stat(75.5, 175.0, date(2024, 6, 1)),
        ];
        let bmi = bmi(&stats).unwrap();
        assert!((bmi - 24.65).abs() < 0.01);
    }

    #[test]
    fn test_bmi_empty_or_zero_height() {
        assert_eq!(bmi(&[]), None);
        assert_eq!(bmi(&[stat(75.0, 0.0, date(2024, 1, 1))]), None);
    }

    #[test]
    fn test_age_respects_birthday() {
        let birth = date(1990, 6, 15);
        assert_eq!(age(birth, date(2024, 6, 14)), 33);
        assert_eq!(age(birth, date(2024, 6, 15)), 34);
        assert_eq!(age(birth, date(2024, 6, 16)), 34);
    }

    #[test]
    fn test_workout_days_deduplicates() {
        let logs = vec![
            log(date(2024, 3, 1)),
            log(date(2024, 3, 1)),
            log(date(2024, 3, 2)),
        ];
        assert_eq!(workout_days(&logs), 2);
    }

    #[test]
    fn test_level_progress_wraps() {
        assert_eq!(level_progress(0), 0);
        assert_eq!(level_progress(42), 42);
        assert_eq!(level_progress(250), 50);
    }
}
