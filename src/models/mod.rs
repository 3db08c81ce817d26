pub mod achievement;
pub mod exercise;
pub mod from_row;
pub mod profile;
pub mod workout_log;

pub use achievement::Achievement;
pub use exercise::{Exercise, ExercisePatch, NewExercise, Weekday, CATEGORIES};
pub use from_row::FromSqliteRow;
pub use profile::{BodyStat, PersonalRecord, Profile, ProfileEdit, ProfileUpdate};
pub use workout_log::{CompletedExercise, NewWorkoutLog, WorkoutLog, WorkoutNote};
