use std::sync::{Arc, Once};

use neofit::db::create_memory_pool;
use neofit::migrations::run_migrations_for_tests;
use neofit::models::{NewExercise, Weekday};
use neofit::{Gateway, Identity, SqliteGateway};

static INIT_TRACING: Once = Once::new();

pub fn setup_gateway() -> Arc<SqliteGateway> {
    INIT_TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });

    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    Arc::new(SqliteGateway::new(pool))
}

pub async fn sign_up(gateway: &SqliteGateway, email: &str) -> Identity {
    neofit::session::sign_up(gateway, email, "password123")
        .await
        .expect("Failed to sign up")
}

#[allow(dead_code)]
pub fn new_exercise(name: &str, day: Weekday) -> NewExercise {
    NewExercise {
        name: name.to_string(),
        category: "chest".to_string(),
        sets: 3,
        reps: 12,
        weight: 40.0,
        day,
    }
}

#[allow(dead_code)]
pub async fn seed_workout_logs(
    gateway: &SqliteGateway,
    identity: &Identity,
    dates: &[chrono::NaiveDate],
) {
    use neofit::models::{CompletedExercise, NewWorkoutLog};

    let owner = identity.authenticated().expect("Expected signed-in user");
    for date in dates {
        gateway
            .insert_workout_log(
                owner,
                &NewWorkoutLog {
                    workout_date: *date,
                    completed_exercises: vec![CompletedExercise {
                        name: "Agachamento".to_string(),
                        sets: 3,
                        reps: 10,
                        weight_kg: 60.0,
                    }],
                    notes: None,
                    energy_level: None,
                    pain_level: None,
                },
            )
            .await
            .expect("Failed to insert workout log");
    }
}
